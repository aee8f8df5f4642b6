//! DNS wire format: header, names, resource record data, packet parsing and
//! query building.

mod builder;
mod enums;
mod error;
mod header;
mod name;
mod parser;
mod rrdata;
mod structs;

pub use self::builder::{Additional, Answers, Builder, Nameservers, Questions};
pub use self::enums::{Class, Opcode, QueryClass, QueryType, ResponseCode, Type};
pub use self::error::Error;
pub use self::header::Header;
pub use self::name::Name;
pub use self::rrdata::RRData;
pub use self::structs::{Packet, Question, ResourceRecord};

/// Size of the fixed DNS header
pub const HEADER_SIZE: usize = 12;
/// Size of the type and class that follow a question name
pub const QUESTION_FIXED_SIZE: usize = 4;
/// Size of the type, class, ttl and rdata length that follow a record name
pub const RR_FIXED_SIZE: usize = 10;
