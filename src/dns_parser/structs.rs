use super::{Class, Header, Name, QueryClass, QueryType, RRData};

/// Parsed DNS packet
#[derive(Debug)]
pub struct Packet<'a> {
    pub header: Header,
    pub questions: Vec<Question<'a>>,
    pub answers: Vec<ResourceRecord<'a>>,
    pub nameservers: Vec<ResourceRecord<'a>>,
    pub additional: Vec<ResourceRecord<'a>>,
}

/// A parsed chunk of data in the Query section of the packet
#[derive(Debug)]
pub struct Question<'a> {
    pub qname: Name<'a>,
    pub qtype: QueryType,
    pub qclass: QueryClass,
}

/// A single DNS record
#[derive(Debug)]
pub struct ResourceRecord<'a> {
    pub name: Name<'a>,
    pub cls: Class,
    pub ttl: u32,
    pub data: RRData<'a>,
}

impl<'a> Packet<'a> {
    /// The question a response echoes back
    pub fn question(&self) -> Option<&Question<'a>> {
        self.questions.first()
    }
}

impl<'a> ResourceRecord<'a> {
    /// Whether `name` owns this record, ignoring ASCII case
    pub fn owned_by(&self, name: &str) -> bool {
        self.name
            .to_string()
            .eq_ignore_ascii_case(name.trim_end_matches('.'))
    }
}
