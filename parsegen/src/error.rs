use std::error;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A rule declaration carried a token string that could not be turned
    /// into a rule.
    RuleDefinition { name: String, token: String },
    UnknownRule(String),
    UnknownSequence(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::RuleDefinition {
                ref name,
                ref token,
            } => write!(f, "invalid definition for rule '{}': '{}'", name, token),
            Error::UnknownRule(ref name) => write!(f, "unknown rule: {}", name),
            Error::UnknownSequence(ref name) => write!(f, "unknown sequence: {}", name),
        }
    }
}

impl error::Error for Error {}
