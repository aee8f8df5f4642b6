//! Typed resource records decoded from resolver responses.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::dns_parser::{QueryType, RRData, Type};
use crate::error::AresError;

/// The record types a query may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Ns,
    Cname,
    Ptr,
    Aaaa,
    Srv,
}

impl RecordType {
    pub(crate) fn from_wire(code: u16) -> Option<RecordType> {
        match Type::parse(code) {
            Ok(Type::A) => Some(RecordType::A),
            Ok(Type::NS) => Some(RecordType::Ns),
            Ok(Type::CNAME) => Some(RecordType::Cname),
            Ok(Type::PTR) => Some(RecordType::Ptr),
            Ok(Type::AAAA) => Some(RecordType::Aaaa),
            Ok(Type::SRV) => Some(RecordType::Srv),
            _ => None,
        }
    }

    pub(crate) fn wire_type(self) -> Type {
        match self {
            RecordType::A => Type::A,
            RecordType::Ns => Type::NS,
            RecordType::Cname => Type::CNAME,
            RecordType::Ptr => Type::PTR,
            RecordType::Aaaa => Type::AAAA,
            RecordType::Srv => Type::SRV,
        }
    }

    pub(crate) fn query_type(self) -> QueryType {
        match self {
            RecordType::A => QueryType::A,
            RecordType::Ns => QueryType::NS,
            RecordType::Cname => QueryType::CNAME,
            RecordType::Ptr => QueryType::PTR,
            RecordType::Aaaa => QueryType::AAAA,
            RecordType::Srv => QueryType::SRV,
        }
    }
}

/// Payload of a decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Ptr(String),
    Ns(String),
    Srv(SrvRecord),
}

/// Service location, RFC 2782
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// A resource record owned independently of the response buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    name: String,
    ttl: u32,
    data: RecordData,
}

impl DnsRecord {
    pub fn new(name: String, ttl: u32, data: RecordData) -> DnsRecord {
        DnsRecord { name, ttl, data }
    }

    /// Decodes the rdata of one record
    ///
    /// A and AAAA payloads must be exactly 4 and 16 bytes, SRV needs its six
    /// fixed bytes followed by a target name. Types outside the supported
    /// set are a bad response.
    pub(crate) fn decode(
        name: String,
        typ: u16,
        ttl: u32,
        rdata: &[u8],
        original: &[u8],
    ) -> Result<DnsRecord, AresError> {
        let typ = RecordType::from_wire(typ).ok_or(AresError::BadResponse)?;
        let data = match RRData::parse(typ.wire_type(), rdata, original)? {
            RRData::A(addr) => RecordData::A(addr),
            RRData::AAAA(addr) => RecordData::Aaaa(addr),
            RRData::CNAME(host) => RecordData::Cname(host.to_string()),
            RRData::PTR(host) => RecordData::Ptr(host.to_string()),
            RRData::NS(host) => RecordData::Ns(host.to_string()),
            RRData::SRV {
                priority,
                weight,
                port,
                target,
            } => RecordData::Srv(SrvRecord {
                priority,
                weight,
                port,
                target: target.to_string(),
            }),
            RRData::Unknown { .. } => return Err(AresError::BadResponse),
        };
        Ok(DnsRecord::new(name, ttl, data))
    }

    pub fn record_type(&self) -> RecordType {
        match self.data {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::Aaaa,
            RecordData::Cname(_) => RecordType::Cname,
            RecordData::Ptr(_) => RecordType::Ptr,
            RecordData::Ns(_) => RecordType::Ns,
            RecordData::Srv(_) => RecordType::Srv,
        }
    }

    /// Owner name of the record
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Address carried by an A or AAAA record
    pub fn addr(&self) -> Option<IpAddr> {
        match self.data {
            RecordData::A(addr) => Some(addr.into()),
            RecordData::Aaaa(addr) => Some(addr.into()),
            _ => None,
        }
    }

    /// Host name carried by a CNAME, PTR, NS or SRV record
    pub fn host(&self) -> Option<&str> {
        match self.data {
            RecordData::Cname(ref host) | RecordData::Ptr(ref host) | RecordData::Ns(ref host) => {
                Some(host)
            }
            RecordData::Srv(ref srv) => Some(&srv.target),
            _ => None,
        }
    }

    pub fn srv(&self) -> Option<&SrvRecord> {
        match self.data {
            RecordData::Srv(ref srv) => Some(srv),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_a_record() {
        let record = DnsRecord::decode("h".into(), 1, 30, b"\x0a\x00\x00\x01", b"").unwrap();
        assert_eq!(record.record_type(), RecordType::A);
        assert_eq!(record.addr(), Some(IpAddr::from([10, 0, 0, 1])));
        assert_eq!(record.ttl(), 30);
    }

    #[test]
    fn decode_a_record_wrong_length() {
        assert_eq!(
            DnsRecord::decode("h".into(), 1, 30, b"\x0a\x00\x00", b""),
            Err(AresError::BadResponse)
        );
        assert_eq!(
            DnsRecord::decode("h".into(), 1, 30, b"\x0a\x00\x00\x01\x02", b""),
            Err(AresError::BadResponse)
        );
    }

    #[test]
    fn decode_aaaa_record() {
        let mut rdata = [0u8; 16];
        rdata[15] = 1;
        let record = DnsRecord::decode("h".into(), 28, 30, &rdata, b"").unwrap();
        assert_eq!(record.addr(), Some(IpAddr::from(Ipv6Addr::LOCALHOST)));
        assert_eq!(
            DnsRecord::decode("h".into(), 28, 30, &rdata[..4], b""),
            Err(AresError::BadResponse)
        );
    }

    #[test]
    fn decode_srv_record() {
        let rdata = b"\x00\x0a\x00\x14\x01\xbb\x07example\x03com\x00";
        let record = DnsRecord::decode("_sip._tcp.example.com".into(), 33, 60, rdata, rdata)
            .unwrap();
        assert_eq!(
            record.srv(),
            Some(&SrvRecord {
                priority: 10,
                weight: 20,
                port: 443,
                target: "example.com".into(),
            })
        );
        assert_eq!(record.host(), Some("example.com"));
    }

    #[test]
    fn decode_srv_record_too_short() {
        assert_eq!(
            DnsRecord::decode("h".into(), 33, 60, b"\x00\x0a\x00\x14\x01\xbb", b""),
            Err(AresError::BadResponse)
        );
    }

    #[test]
    fn decode_unsupported_type() {
        assert_eq!(
            DnsRecord::decode("h".into(), 16, 60, b"\x03abc", b""),
            Err(AresError::BadResponse)
        );
    }
}
