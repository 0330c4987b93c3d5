//! Named grammar productions built from ordered sections.

use std::collections::HashMap;

use serde::Deserialize;

/// One section object of a sequence declaration. List fields hold comma
/// separated names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionDecl {
    pub token_list: String,
    pub sequence_list: String,
    pub ebnf_item: String,
    pub var_name: String,
    pub is_optional: bool,
    pub is_repeating: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SequenceDecl {
    #[serde(default)]
    pub sequence: Vec<SectionDecl>,
}

/// One step of a sequence. Tokens are tried before sequences, each list in
/// declaration order, and the first that matches wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceSection {
    pub is_optional: bool,
    pub is_repeating: bool,
    pub tokens: Vec<String>,
    pub sequences: Vec<String>,
    pub variable_name: Option<String>,
    pub ebnf_item: String,
}

impl SequenceSection {
    pub fn tokens<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SequenceSection {
            tokens: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn sequences<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SequenceSection {
            sequences: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn repeating(mut self) -> Self {
        self.is_repeating = true;
        self
    }

    pub fn capture(mut self, variable: impl Into<String>) -> Self {
        self.variable_name = Some(variable.into());
        self
    }
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

impl From<&SectionDecl> for SequenceSection {
    fn from(decl: &SectionDecl) -> Self {
        SequenceSection {
            is_optional: decl.is_optional,
            is_repeating: decl.is_repeating,
            tokens: split_names(&decl.token_list),
            sequences: split_names(&decl.sequence_list),
            variable_name: Some(decl.var_name.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
            ebnf_item: decl.ebnf_item.clone(),
        }
    }
}

/// A named grammar production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSequence {
    pub name: String,
    pub sections: Vec<SequenceSection>,
}

impl ParserSequence {
    pub fn new(name: impl Into<String>, sections: Vec<SequenceSection>) -> Self {
        ParserSequence {
            name: name.into(),
            sections,
        }
    }

    pub fn from_decl(name: &str, decl: &SequenceDecl) -> Self {
        ParserSequence::new(name, decl.sequence.iter().map(Into::into).collect())
    }

    /// Count of (mandatory, optional) sections.
    pub fn section_balance(&self) -> (usize, usize) {
        let optional = self.sections.iter().filter(|s| s.is_optional).count();
        (self.sections.len() - optional, optional)
    }
}

/// All sequences known to an engine, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SequenceTable {
    sequences: Vec<ParserSequence>,
    index: HashMap<String, usize>,
}

impl SequenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<'a, I>(decls: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a SequenceDecl)>,
    {
        let mut table = SequenceTable::new();
        table.declare(decls);
        table
    }

    pub fn declare<'a, I>(&mut self, decls: I)
    where
        I: IntoIterator<Item = (&'a str, &'a SequenceDecl)>,
    {
        for (name, decl) in decls {
            self.insert(ParserSequence::from_decl(name, decl));
        }
    }

    /// Insert a sequence, replacing any sequence with the same name in place.
    pub fn insert(&mut self, sequence: ParserSequence) {
        match self.index.get(&sequence.name) {
            Some(&i) => self.sequences[i] = sequence,
            None => {
                self.index.insert(sequence.name.clone(), self.sequences.len());
                self.sequences.push(sequence);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParserSequence> {
        self.index.get(name).map(|&i| &self.sequences[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParserSequence> {
        self.sequences.iter()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
