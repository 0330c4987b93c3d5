//! The textual side of EBNF rules: compaction, bracket groups and section
//! lists.

use std::fmt::{self, Display};

mod error;
pub use error::{Error, Result};
mod group;
pub use group::{groups, Containment, Group, GroupKind};
mod parser;
pub use parser::{identifier, terminal, Class, Reference};
mod section;
pub use section::build_sections;

/// A production rule as text, `lhs=rhs;`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Production {
    pub lhs: String,
    pub rhs: String,
}

impl Production {
    pub fn new(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Production {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={};", self.lhs, self.rhs)
    }
}

/// Remove whitespace that is not inside a quoted terminal.
pub fn compact(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None if c.is_whitespace() => {}
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
    out
}
