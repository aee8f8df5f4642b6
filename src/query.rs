//! Decoding of complete resolver responses into typed records.

use byteorder::{BigEndian, ByteOrder};
use log::debug;

use crate::dns_parser::{Class, Header, Name, HEADER_SIZE, QUESTION_FIXED_SIZE, RR_FIXED_SIZE};
use crate::error::AresError;
use crate::record::{DnsRecord, RecordType};

/// A response decoded into its three record sections
///
/// Records keep the order the server sent them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    query: String,
    record_type: RecordType,
    answers: Vec<DnsRecord>,
    authorities: Vec<DnsRecord>,
    additional: Vec<DnsRecord>,
}

impl QueryResponse {
    /// Decodes a raw response
    ///
    /// Fails with `NoData` when there is no question or no record at all,
    /// `BadQuery` when the first question asks for a type outside
    /// [`RecordType`], and `BadResponse` for a non-Internet class, a record
    /// running past the buffer or an unsupported record type.
    pub fn parse(buf: &[u8]) -> Result<QueryResponse, AresError> {
        if buf.len() < HEADER_SIZE {
            return Err(AresError::BadResponse);
        }
        let qdcount = Header::question_count(buf);
        let ancount = Header::answer_count(buf) as usize;
        let nscount = Header::nameserver_count(buf) as usize;
        let arcount = Header::additional_count(buf) as usize;

        if qdcount == 0 || ancount + nscount + arcount == 0 {
            return Err(AresError::NoData);
        }

        let mut pos = HEADER_SIZE;
        let mut query = None;
        for i in 0..qdcount {
            let (name, len) = Name::expand(buf, pos)?;
            pos += len;
            if pos + QUESTION_FIXED_SIZE > buf.len() {
                return Err(AresError::BadResponse);
            }
            if i == 0 {
                let qtype = BigEndian::read_u16(&buf[pos..pos + 2]);
                let record_type = match RecordType::from_wire(qtype) {
                    Some(t) => t,
                    None => {
                        debug!("cannot decode a response to query type {}", qtype);
                        return Err(AresError::BadQuery);
                    }
                };
                query = Some((name, record_type));
            }
            pos += QUESTION_FIXED_SIZE;
        }
        let (query, record_type) = query.ok_or(AresError::NoData)?;

        let answers = parse_section(buf, ancount, &mut pos)?;
        let authorities = parse_section(buf, nscount, &mut pos)?;
        let additional = parse_section(buf, arcount, &mut pos)?;

        Ok(QueryResponse {
            query,
            record_type,
            answers,
            authorities,
            additional,
        })
    }

    /// The name echoed in the first question
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn answers(&self) -> &[DnsRecord] {
        &self.answers
    }

    pub fn authorities(&self) -> &[DnsRecord] {
        &self.authorities
    }

    pub fn additional(&self) -> &[DnsRecord] {
        &self.additional
    }

    pub fn into_answers(self) -> Vec<DnsRecord> {
        self.answers
    }
}

fn parse_section(buf: &[u8], count: usize, pos: &mut usize) -> Result<Vec<DnsRecord>, AresError> {
    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        match parse_record(buf, pos) {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!("failed to parse RR {}: {}", i, err);
                return Err(err);
            }
        }
    }
    Ok(records)
}

fn parse_record(buf: &[u8], pos: &mut usize) -> Result<DnsRecord, AresError> {
    let (name, len) = Name::expand(buf, *pos)?;
    *pos += len;
    if *pos + RR_FIXED_SIZE > buf.len() {
        return Err(AresError::BadResponse);
    }
    let fixed = &buf[*pos..*pos + RR_FIXED_SIZE];
    let typ = BigEndian::read_u16(&fixed[0..2]);
    let class = BigEndian::read_u16(&fixed[2..4]);
    let ttl = BigEndian::read_u32(&fixed[4..8]);
    let rdlength = BigEndian::read_u16(&fixed[8..10]) as usize;
    if class != Class::IN as u16 {
        return Err(AresError::BadResponse);
    }
    *pos += RR_FIXED_SIZE;
    if *pos + rdlength > buf.len() {
        return Err(AresError::BadResponse);
    }
    let rdata = &buf[*pos..*pos + rdlength];
    let record = DnsRecord::decode(name, typ, ttl, rdata, buf)?;
    *pos += rdlength;
    Ok(record)
}
