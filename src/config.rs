//! Rule and sequence documents, and engine settings.
//!
//! Documents are JSON objects. Key order is kept, since declaration order
//! decides both tie-breaking between rules and the order sequences are tried
//! in when checking against all of them.

use std::str::FromStr;

use parsegen::{CheckOptions, RuleDecl, SequenceDecl, DEFAULT_MAX_LEVEL};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub max_level: usize,
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_level: DEFAULT_MAX_LEVEL,
            verbose: false,
        }
    }
}

impl EngineConfig {
    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            max_level: self.max_level,
            verbose: self.verbose,
        }
    }
}

impl FromStr for EngineConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

fn entries<T: DeserializeOwned>(s: &str) -> Result<Vec<(String, T)>> {
    let map: Map<String, Value> = serde_json::from_str(s)?;
    map.into_iter()
        .map(|(name, value)| -> Result<(String, T)> { Ok((name, serde_json::from_value(value)?)) })
        .collect()
}

/// Rule name to declaration, e.g. `{"digit": "char_in:0123456789"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDocument {
    pub rules: Vec<(String, RuleDecl)>,
}

impl RuleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration. Later declarations of a name win.
    pub fn with(mut self, name: &str, decl: impl Into<RuleDecl>) -> Self {
        self.rules.push((name.to_owned(), decl.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleDecl)> {
        self.rules.iter().map(|(name, decl)| (name.as_str(), decl))
    }
}

impl FromStr for RuleDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(RuleDocument { rules: entries(s)? })
    }
}

/// Sequence name to declaration, e.g.
/// `{"expr": {"sequence": [{"tokenList": "num"}]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceDocument {
    pub sequences: Vec<(String, SequenceDecl)>,
}

impl SequenceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SequenceDecl)> {
        self.sequences.iter().map(|(name, decl)| (name.as_str(), decl))
    }
}

impl FromStr for SequenceDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(SequenceDocument {
            sequences: entries(s)?,
        })
    }
}
