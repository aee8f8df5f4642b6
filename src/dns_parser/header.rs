use byteorder::{BigEndian, ByteOrder};

use super::{Error, Opcode, ResponseCode, HEADER_SIZE};

mod flag {
    pub const QUERY: u16 = 0b1000_0000_0000_0000;
    pub const OPCODE_MASK: u16 = 0b0111_1000_0000_0000;
    pub const AUTHORITATIVE: u16 = 0b0000_0100_0000_0000;
    pub const TRUNCATED: u16 = 0b0000_0010_0000_0000;
    pub const RECURSION_DESIRED: u16 = 0b0000_0001_0000_0000;
    pub const RECURSION_AVAILABLE: u16 = 0b0000_0000_1000_0000;
    pub const RESERVED_MASK: u16 = 0b0000_0000_0100_0000;
    pub const RESPONSE_CODE_MASK: u16 = 0b0000_0000_0000_1111;
}

/// Represents a parsed header of DNS packet
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Header {
    pub id: u16,
    pub query: bool,
    pub opcode: Opcode,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub response_code: ResponseCode,
    pub questions: u16,
    pub answers: u16,
    pub nameservers: u16,
    pub additional: u16,
}

impl Header {
    pub fn parse(data: &[u8]) -> Result<Header, Error> {
        if data.len() < HEADER_SIZE {
            return Err(Error::HeaderTooShort);
        }
        let flags = BigEndian::read_u16(&data[2..4]);
        if flags & flag::RESERVED_MASK != 0 {
            return Err(Error::ReservedBitsAreNonZero);
        }
        let header = Header {
            id: BigEndian::read_u16(&data[..2]),
            query: flags & flag::QUERY == 0,
            opcode: ((flags & flag::OPCODE_MASK) >> flag::OPCODE_MASK.trailing_zeros()).into(),
            authoritative: flags & flag::AUTHORITATIVE != 0,
            truncated: flags & flag::TRUNCATED != 0,
            recursion_desired: flags & flag::RECURSION_DESIRED != 0,
            recursion_available: flags & flag::RECURSION_AVAILABLE != 0,
            response_code: ((flags & flag::RESPONSE_CODE_MASK) as u8).into(),
            questions: Header::question_count(data),
            answers: Header::answer_count(data),
            nameservers: Header::nameserver_count(data),
            additional: Header::additional_count(data),
        };
        Ok(header)
    }

    /// Write a header to a buffer slice
    ///
    /// # Panics
    ///
    /// When buffer size is not exactly 12 bytes
    pub fn write(&self, data: &mut [u8]) {
        if data.len() != HEADER_SIZE {
            panic!("Header size is exactly 12 bytes");
        }
        let mut flags = 0u16;
        flags |= Into::<u16>::into(self.opcode) << flag::OPCODE_MASK.trailing_zeros();
        flags |= Into::<u8>::into(self.response_code) as u16;
        if !self.query {
            flags |= flag::QUERY;
        }
        if self.authoritative {
            flags |= flag::AUTHORITATIVE;
        }
        if self.recursion_desired {
            flags |= flag::RECURSION_DESIRED;
        }
        if self.recursion_available {
            flags |= flag::RECURSION_AVAILABLE;
        }
        if self.truncated {
            flags |= flag::TRUNCATED;
        }
        BigEndian::write_u16(&mut data[..2], self.id);
        BigEndian::write_u16(&mut data[2..4], flags);
        BigEndian::write_u16(&mut data[4..6], self.questions);
        BigEndian::write_u16(&mut data[6..8], self.answers);
        BigEndian::write_u16(&mut data[8..10], self.nameservers);
        BigEndian::write_u16(&mut data[10..12], self.additional);
    }

    /// Overwrites the response code of an encoded header
    pub fn set_response_code(data: &mut [u8], code: ResponseCode) {
        let flags = BigEndian::read_u16(&data[2..4]) & !flag::RESPONSE_CODE_MASK;
        BigEndian::write_u16(&mut data[2..4], flags | u16::from(u8::from(code)));
    }

    pub fn question_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[4..6])
    }

    pub fn answer_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[6..8])
    }

    pub fn nameserver_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[8..10])
    }

    pub fn additional_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[10..12])
    }

    fn inc_count(data: &mut [u8], offset: usize) -> Option<u16> {
        let count = BigEndian::read_u16(&data[offset..offset + 2]).checked_add(1)?;
        BigEndian::write_u16(&mut data[offset..offset + 2], count);
        Some(count)
    }

    pub fn inc_questions(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 4)
    }

    pub fn inc_answers(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 6)
    }

    pub fn inc_nameservers(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 8)
    }

    pub fn inc_additional(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 10)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_response_header() {
        let data = b"\xda\xdd\x81\x83\x00\x01\x00\x00\x00\x01\x00\x00";
        let header = Header::parse(data).unwrap();
        assert_eq!(header.id, 0xdadd);
        assert!(!header.query);
        assert_eq!(header.opcode, Opcode::StandardQuery);
        assert!(header.recursion_desired);
        assert!(header.recursion_available);
        assert_eq!(header.response_code, ResponseCode::NameError);
        assert_eq!(header.questions, 1);
        assert_eq!(header.answers, 0);
        assert_eq!(header.nameservers, 1);
    }

    #[test]
    fn header_write_then_parse() {
        let header = Header {
            id: 4321,
            query: false,
            opcode: Opcode::StandardQuery,
            authoritative: true,
            truncated: false,
            recursion_desired: true,
            recursion_available: true,
            response_code: ResponseCode::Refused,
            questions: 1,
            answers: 2,
            nameservers: 3,
            additional: 4,
        };
        let mut buf = [0u8; 12];
        header.write(&mut buf);
        assert_eq!(Header::parse(&buf).unwrap(), header);
    }

    #[test]
    fn overwrite_response_code() {
        let mut data = *b"\xda\xdd\x81\x80\x00\x01\x00\x00\x00\x00\x00\x00";
        Header::set_response_code(&mut data, ResponseCode::ServerFailure);
        assert_eq!(&data[2..4], b"\x81\x82");
        Header::set_response_code(&mut data, ResponseCode::NoError);
        assert_eq!(Header::parse(&data).unwrap().response_code, ResponseCode::NoError);
    }

    #[test]
    fn short_header() {
        assert!(matches!(
            Header::parse(b"\x00\x01\x81"),
            Err(Error::HeaderTooShort)
        ));
    }
}
