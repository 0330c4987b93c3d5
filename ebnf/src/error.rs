use std::error;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ParseError(String),
    /// A quoted terminal starting at this offset is never closed.
    UnterminatedTerminal(usize),
    /// A bracket at this offset has no matching partner.
    Unbalanced(usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ParseError(ref s) => write!(f, "failed to parse: {}", s),
            Error::UnterminatedTerminal(at) => write!(f, "unterminated terminal at {}", at),
            Error::Unbalanced(at) => write!(f, "unbalanced bracket at {}", at),
        }
    }
}

impl error::Error for Error {}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Error {
        Error::ParseError(format!("{:?}", err))
    }
}
