//! Token rules and the table that owns them.
//!
//! Rules are declared by name from token strings, then bound to each other
//! by [`RuleTable::resolve`]. Evaluation never errors: a reference that was
//! never bound simply does not match.

use std::collections::HashMap;
use std::fmt::{self, Display};

use serde::Deserialize;

use crate::error::Result;
use crate::tokens::parse_token;

/// Index of a rule inside its [`RuleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub usize);

/// A rule declaration as it appears in a rule document: either a single
/// token string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleDecl {
    Token(String),
    Collection(Vec<String>),
}

impl From<&str> for RuleDecl {
    fn from(s: &str) -> Self {
        RuleDecl::Token(s.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Char(char),
    CharIn(Vec<char>),
    String(String),
    CiString(String),
    Lookup {
        target: String,
        resolved: Option<RuleId>,
    },
    Collection(Vec<RuleKind>),
    Repeat {
        target: String,
        resolved: Option<RuleId>,
    },
}

impl RuleKind {
    /// Priority class used to break ties between spans covering the same
    /// text. Higher wins.
    pub fn ordinal(&self) -> u8 {
        match self {
            RuleKind::Char(_) => 1,
            RuleKind::CharIn(_) => 2,
            RuleKind::Lookup { .. } => 3,
            RuleKind::Collection(_) => 4,
            RuleKind::Repeat { .. } => 5,
            RuleKind::CiString(_) => 6,
            RuleKind::String(_) => 7,
        }
    }

    fn evaluate_char(&self, c: char, table: &RuleTable, hops: usize) -> bool {
        if hops > table.len() {
            return false;
        }
        match self {
            RuleKind::Char(ch) => *ch == c,
            RuleKind::CharIn(set) => set.contains(&c),
            RuleKind::String(lit) => single_char(lit) == Some(c),
            RuleKind::CiString(lit) => {
                single_char(lit).map_or(false, |l| l.to_lowercase().eq(c.to_lowercase()))
            }
            RuleKind::Lookup { resolved, .. } | RuleKind::Repeat { resolved, .. } => resolved
                .and_then(|id| table.get(id))
                .map_or(false, |rule| rule.kind.evaluate_char(c, table, hops + 1)),
            RuleKind::Collection(members) => members
                .iter()
                .any(|member| member.evaluate_char(c, table, hops + 1)),
        }
    }

    fn evaluate_str(&self, s: &str, table: &RuleTable, hops: usize) -> bool {
        if hops > table.len() {
            return false;
        }
        match self {
            RuleKind::Char(_) | RuleKind::CharIn(_) => {
                single_char(s).map_or(false, |c| self.evaluate_char(c, table, hops))
            }
            RuleKind::String(lit) => lit == s,
            RuleKind::CiString(lit) => eq_ignore_case(lit, s),
            RuleKind::Lookup { resolved, .. } => resolved
                .and_then(|id| table.get(id))
                .map_or(false, |rule| rule.kind.evaluate_str(s, table, hops + 1)),
            RuleKind::Collection(members) => members
                .iter()
                .any(|member| member.evaluate_str(s, table, hops + 1)),
            RuleKind::Repeat { resolved, .. } => {
                let target = match resolved.and_then(|id| table.get(id)) {
                    Some(rule) => rule,
                    None => return false,
                };
                !s.is_empty()
                    && s.chars()
                        .all(|c| target.kind.evaluate_char(c, table, hops + 1))
            }
        }
    }

    fn resolve(&mut self, index: &HashMap<String, RuleId>) -> Vec<String> {
        match self {
            RuleKind::Lookup { target, resolved } | RuleKind::Repeat { target, resolved } => {
                *resolved = index.get(target.as_str()).copied();
                match resolved {
                    Some(_) => Vec::new(),
                    None => vec![target.clone()],
                }
            }
            RuleKind::Collection(members) => members
                .iter_mut()
                .flat_map(|member| member.resolve(index))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Case-insensitive comparison using Unicode simple lowercase mapping.
/// Locale is never consulted.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// A named token rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Rule {
            name: name.into(),
            kind,
        }
    }

    /// Build a rule from a declaration. Arrays become collections, with each
    /// element parsed as its own token string.
    pub fn from_decl(name: &str, decl: &RuleDecl) -> Result<Self> {
        let kind = match decl {
            RuleDecl::Token(token) => parse_token(name, token)?,
            RuleDecl::Collection(tokens) => RuleKind::Collection(
                tokens
                    .iter()
                    .map(|token| parse_token(name, token))
                    .collect::<Result<_>>()?,
            ),
        };
        Ok(Rule::new(name, kind))
    }

    pub fn ordinal(&self) -> u8 {
        self.kind.ordinal()
    }

    /// Check a single character against this rule.
    pub fn evaluate_char(&self, c: char, table: &RuleTable) -> bool {
        self.kind.evaluate_char(c, table, 0)
    }

    /// Check a whole slice against this rule. There are no partial matches:
    /// string rules compare the entire slice.
    pub fn evaluate_str(&self, s: &str, table: &RuleTable) -> bool {
        self.kind.evaluate_str(s, table, 0)
    }
}

/// A reference from one rule to a name that no rule carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub rule: String,
    pub target: String,
}

impl Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rule '{}' references unknown rule '{}'", self.rule, self.target)
    }
}

/// All token rules known to an engine, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    index: HashMap<String, RuleId>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare and resolve in one go.
    pub fn build<'a, I>(decls: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a RuleDecl)>,
    {
        let mut table = RuleTable::new();
        table.declare(decls)?;
        table.resolve();
        Ok(table)
    }

    /// Add rules from declarations. Either every declaration is accepted or
    /// the table is left untouched. References are not bound until the next
    /// call to [`RuleTable::resolve`].
    pub fn declare<'a, I>(&mut self, decls: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a RuleDecl)>,
    {
        let rules = decls
            .into_iter()
            .map(|(name, decl)| Rule::from_decl(name, decl))
            .collect::<Result<Vec<_>>>()?;
        for rule in rules {
            self.insert(rule);
        }
        Ok(())
    }

    /// Insert a rule, replacing any rule with the same name in place.
    pub fn insert(&mut self, rule: Rule) -> RuleId {
        match self.index.get(&rule.name) {
            Some(&id) => {
                self.rules[id.0] = rule;
                id
            }
            None => {
                let id = RuleId(self.rules.len());
                self.index.insert(rule.name.clone(), id);
                self.rules.push(rule);
                id
            }
        }
    }

    /// Bind every lookup, repeat and collection member to the rule it names.
    /// References that cannot be bound are returned and left as `None`.
    pub fn resolve(&mut self) -> Vec<UnresolvedReference> {
        let mut unresolved = Vec::new();
        for rule in self.rules.iter_mut() {
            for target in rule.kind.resolve(&self.index) {
                let reference = UnresolvedReference {
                    rule: rule.name.clone(),
                    target,
                };
                log::warn!("{}", reference);
                unresolved.push(reference);
            }
        }
        unresolved
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    pub fn id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Rule> {
        self.id(name).and_then(|id| self.get(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn name(&self, id: RuleId) -> Option<&str> {
        self.get(id).map(|rule| rule.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
