use log::error;
use thiserror::Error;

/// Problem found in a message template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("line {line}: unexpected end of template")]
    UnexpectedEnd { line: u32 },
    #[error("line {line}: expected {expected}, found {found:?}")]
    Expected {
        line: u32,
        expected: &'static str,
        found: String,
    },
    #[error("line {line}: invalid {what} {token:?}")]
    Invalid {
        line: u32,
        what: &'static str,
        token: String,
    },
    #[error("line {line}: duplicate {what} {name:?}")]
    Duplicate {
        line: u32,
        what: &'static str,
        name: String,
    },
}

impl TemplateError {
    /// Source line the problem was found on, 0 when unknown
    pub fn line(&self) -> u32 {
        match *self {
            TemplateError::UnexpectedEnd { line }
            | TemplateError::Expected { line, .. }
            | TemplateError::Invalid { line, .. }
            | TemplateError::Duplicate { line, .. } => line,
        }
    }
}

/// Stops everything over a malformed template
pub(crate) fn fatal(err: TemplateError) -> ! {
    error!("malformed message template: {}", err);
    panic!("malformed message template: {}", err);
}
