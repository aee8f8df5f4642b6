use byteorder::{BigEndian, ByteOrder};

use super::{Class, Error, Header, Name, QueryClass, QueryType, RRData, Type};
use super::{Packet, Question, ResourceRecord, HEADER_SIZE, QUESTION_FIXED_SIZE, RR_FIXED_SIZE};

impl<'a> Packet<'a> {
    /// Parse a full DNS Packet and return a structure that has all the
    /// data borrowed from the passed buffer.
    pub fn parse(data: &[u8]) -> Result<Packet, Error> {
        let header = Header::parse(data)?;
        let mut offset = HEADER_SIZE;
        let mut questions = Vec::with_capacity(header.questions as usize);
        for _ in 0..header.questions {
            let (question, size) = Question::parse(&data[offset..], data)?;
            offset += size;
            questions.push(question);
        }
        let mut answers = Vec::with_capacity(header.answers as usize);
        for _ in 0..header.answers {
            answers.push(parse_record(data, &mut offset)?);
        }
        let mut nameservers = Vec::with_capacity(header.nameservers as usize);
        for _ in 0..header.nameservers {
            nameservers.push(parse_record(data, &mut offset)?);
        }
        let mut additional = Vec::with_capacity(header.additional as usize);
        for _ in 0..header.additional {
            additional.push(parse_record(data, &mut offset)?);
        }
        Ok(Packet {
            header: header,
            questions: questions,
            answers: answers,
            nameservers: nameservers,
            additional: additional,
        })
    }
}

impl<'a> Question<'a> {
    /// Parses the question at the start of `data`, returning it together
    /// with its encoded size
    pub fn parse(data: &'a [u8], original: &'a [u8]) -> Result<(Question<'a>, usize), Error> {
        let (qname, size) = Name::scan(data, original)?;
        if data.len() < size + QUESTION_FIXED_SIZE {
            return Err(Error::UnexpectedEOF);
        }
        let qtype = QueryType::parse(BigEndian::read_u16(&data[size..size + 2]))?;
        let qclass = QueryClass::parse(BigEndian::read_u16(&data[size + 2..size + 4]))?;
        Ok((
            Question {
                qname: qname,
                qtype: qtype,
                qclass: qclass,
            },
            size + QUESTION_FIXED_SIZE,
        ))
    }
}

// Generic function to parse answer, nameservers, and additional records.
fn parse_record<'a>(data: &'a [u8], offset: &mut usize) -> Result<ResourceRecord<'a>, Error> {
    if *offset >= data.len() {
        return Err(Error::UnexpectedEOF);
    }
    let (name, name_size) = Name::scan(&data[*offset..], data)?;
    *offset += name_size;
    if *offset + RR_FIXED_SIZE > data.len() {
        return Err(Error::UnexpectedEOF);
    }
    let code = BigEndian::read_u16(&data[*offset..*offset + 2]);
    *offset += 2;
    let cls = Class::parse(BigEndian::read_u16(&data[*offset..*offset + 2]))?;
    *offset += 2;
    let ttl = BigEndian::read_u32(&data[*offset..*offset + 4]);
    *offset += 4;
    let rdlen = BigEndian::read_u16(&data[*offset..*offset + 2]) as usize;
    *offset += 2;
    if *offset + rdlen > data.len() {
        return Err(Error::UnexpectedEOF);
    }
    let rdata = &data[*offset..*offset + rdlen];
    let record = ResourceRecord {
        name,
        cls,
        ttl,
        data: match Type::parse(code) {
            Ok(typ) => RRData::parse(typ, rdata, data)?,
            Err(_) => RRData::Unknown { typ: code, data: rdata },
        },
    };
    *offset += rdlen;
    Ok(record)
}
