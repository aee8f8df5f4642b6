use thiserror::Error;

/// Error parsing DNS packet
#[derive(Debug, Error)]
pub enum Error {
    #[error("packet is smaller than header size")]
    HeaderTooShort,
    #[error("packet has incomplete data")]
    UnexpectedEOF,
    #[error("wrong (too short or too long) size of RDATA")]
    WrongRdataLength,
    #[error("packet has non-zero reserved bits")]
    ReservedBitsAreNonZero,
    #[error("label in domain name has unknown label format")]
    UnknownLabelFormat,
    #[error("compressed domain name points back into itself")]
    NamePointerLoop,
    #[error("label in domain name is longer than 63 bytes")]
    LabelTooLong,
    #[error("domain name is longer than 255 bytes")]
    NameTooLong,
    #[error("query type {0} is invalid")]
    InvalidQueryType(u16),
    #[error("query class {0} is invalid")]
    InvalidQueryClass(u16),
    #[error("type {0} is invalid")]
    InvalidType(u16),
    #[error("class {0} is invalid")]
    InvalidClass(u16),
    #[error("invalid characters encountered while reading label")]
    LabelIsNotAscii,
}
