//! Reader for the message template format, the text file that lays out
//! every message of the simulator protocol.
//!
//! The file is developer maintained and read once at startup, so a
//! malformed template is fatal: the problem is logged with its line number
//! and the parser panics.

mod check;
mod error;
mod message;
mod parser;
mod tokenizer;

pub use self::error::TemplateError;
pub use self::message::{
    BlockType, Deprecation, Encoding, Frequency, MessageBlock, MessageTemplate, MessageVariable,
    Trust, VariableType,
};
pub use self::parser::TemplateParser;
pub use self::tokenizer::TemplateTokenizer;
