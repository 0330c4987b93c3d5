use std::error;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A rule document carried a token string that is not a valid rule.
    RuleDefinition(parsegen::Error),
    /// EBNF text that does not match the `rule` meta-grammar.
    GrammarSyntax(String),
    /// EBNF text that parsed but could not be turned into rules.
    GrammarSynthesis(String),
    Config(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::RuleDefinition(ref err) => write!(f, "{}", err),
            Error::GrammarSyntax(ref s) => write!(f, "grammar syntax error: {}", s),
            Error::GrammarSynthesis(ref s) => write!(f, "grammar synthesis error: {}", s),
            Error::Config(ref err) => write!(f, "invalid config: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::RuleDefinition(ref err) => Some(err),
            Error::Config(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<parsegen::Error> for Error {
    fn from(err: parsegen::Error) -> Error {
        Error::RuleDefinition(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Config(err)
    }
}
