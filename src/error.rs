use thiserror::Error;

use crate::dns_parser;

/// Status of a failed resolver operation
///
/// The numeric codes follow the c-ares status values, so `code()` can be
/// logged and compared with other tooling.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AresError {
    #[error("DNS server returned answer with no data")]
    NoData,
    #[error("DNS server claims query was misformatted")]
    FormErr,
    #[error("DNS server returned general failure")]
    ServFail,
    #[error("Domain name not found")]
    NotFound,
    #[error("DNS server does not implement requested operation")]
    NotImp,
    #[error("DNS server refused query")]
    Refused,
    #[error("Misformatted DNS query")]
    BadQuery,
    #[error("Misformatted domain name")]
    BadName,
    #[error("Unsupported address family")]
    BadFamily,
    #[error("Misformatted DNS reply")]
    BadResponse,
    #[error("Could not contact DNS servers")]
    ConnRefused,
    #[error("Timeout while contacting DNS servers")]
    Timeout,
    #[error("End of file")]
    Eof,
    #[error("Error reading file")]
    File,
    #[error("Out of memory")]
    NoMem,
    #[error("Channel is being destroyed")]
    Destruction,
    #[error("Misformatted string")]
    BadStr,
    #[error("Illegal flags specified")]
    BadFlags,
    #[error("Resolver channel is not initialized")]
    NotInitialized,
    #[error("DNS query cancelled")]
    Cancelled,
}

const CODES: &[(i32, AresError)] = &[
    (1, AresError::NoData),
    (2, AresError::FormErr),
    (3, AresError::ServFail),
    (4, AresError::NotFound),
    (5, AresError::NotImp),
    (6, AresError::Refused),
    (7, AresError::BadQuery),
    (8, AresError::BadName),
    (9, AresError::BadFamily),
    (10, AresError::BadResponse),
    (11, AresError::ConnRefused),
    (12, AresError::Timeout),
    (13, AresError::Eof),
    (14, AresError::File),
    (15, AresError::NoMem),
    (16, AresError::Destruction),
    (17, AresError::BadStr),
    (18, AresError::BadFlags),
    (21, AresError::NotInitialized),
    (24, AresError::Cancelled),
];

/// Code reported for a successful operation
pub const SUCCESS: i32 = 0;

impl AresError {
    pub fn code(self) -> i32 {
        CODES
            .iter()
            .find(|(_, err)| *err == self)
            .map(|(code, _)| *code)
            .unwrap_or(-1)
    }

    pub fn from_code(code: i32) -> Option<AresError> {
        CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, err)| *err)
    }

    /// Human readable text for a numeric status code
    pub fn describe(code: i32) -> String {
        if code == SUCCESS {
            return "Successful completion".to_owned();
        }
        match AresError::from_code(code) {
            Some(err) => err.to_string(),
            None => "unknown".to_owned(),
        }
    }
}

impl From<dns_parser::Error> for AresError {
    fn from(err: dns_parser::Error) -> AresError {
        match err {
            dns_parser::Error::UnknownLabelFormat
            | dns_parser::Error::NamePointerLoop
            | dns_parser::Error::LabelTooLong
            | dns_parser::Error::NameTooLong
            | dns_parser::Error::LabelIsNotAscii => AresError::BadName,
            _ => AresError::BadResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_both_ways() {
        for &(code, err) in CODES {
            assert_eq!(err.code(), code);
            assert_eq!(AresError::from_code(code), Some(err));
        }
        assert_eq!(AresError::from_code(99), None);
    }

    #[test]
    fn describe_codes() {
        assert_eq!(AresError::describe(0), "Successful completion");
        assert_eq!(AresError::describe(4), "Domain name not found");
        assert_eq!(AresError::describe(12), "Timeout while contacting DNS servers");
        assert_eq!(AresError::describe(1000), "unknown");
    }
}
