//! A lexing and parsing runtime driven entirely by data.
//!
//! Token rules are turned into an organized forest of [`Span`]s by the
//! [`Lexer`], and named [`ParserSequence`]s are evaluated against that forest
//! with backtracking by [`State`].

mod error;
mod lexer;
mod rule;
mod sequence;
mod span;
mod state;
mod tokens;
mod tree;

pub use error::{Error, Result};
pub use lexer::{organize, Lexer};
pub use rule::{Rule, RuleDecl, RuleId, RuleKind, RuleTable, UnresolvedReference};
pub use sequence::{ParserSequence, SectionDecl, SequenceDecl, SequenceSection, SequenceTable};
pub use span::{forest_end, RelativeLocation, Span};
pub use state::{find_token, Check, CheckOptions, State, Target, DEFAULT_MAX_LEVEL};
pub use tokens::{parse_token, TokenKind};
pub use tree::{group_name, Node, NodeId, ParseTree, ParserResult, QUALIFIER_SEPARATOR};

/// A rule table together with the sequences evaluated over it.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub rules: RuleTable,
    pub sequences: SequenceTable,
}

impl Grammar {
    pub fn new(rules: RuleTable, sequences: SequenceTable) -> Self {
        Grammar { rules, sequences }
    }

    pub fn lex(&self, input: &str) -> Vec<Span> {
        Lexer::new(&self.rules).lex(input)
    }

    pub fn check(&self, spans: &[Span], target: Target<'_>, options: CheckOptions) -> Check {
        State::new(&self.rules, &self.sequences, spans, options).check(target)
    }

    /// Lex `input` and check it in one step.
    pub fn parse(&self, input: &str, target: Target<'_>, options: CheckOptions) -> Check {
        let spans = self.lex(input);
        self.check(&spans, target, options)
    }

    pub fn rule(&self, name: &str) -> Result<&Rule> {
        self.rules
            .by_name(name)
            .ok_or_else(|| Error::UnknownRule(name.to_owned()))
    }

    pub fn sequence(&self, name: &str) -> Result<&ParserSequence> {
        self.sequences
            .get(name)
            .ok_or_else(|| Error::UnknownSequence(name.to_owned()))
    }

    /// Check whether a name refers to a known token rule.
    pub fn is_token(&self, name: &str) -> bool {
        self.rules.contains(name)
    }

    pub fn is_sequence(&self, name: &str) -> bool {
        self.sequences.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookups() {
        let rules = RuleTable::build(vec![("digit", &RuleDecl::from("char_in:0123456789"))]).unwrap();
        let mut sequences = SequenceTable::new();
        sequences.insert(ParserSequence::new("num", vec![SequenceSection::tokens(vec!["digit"]).repeating()]));
        let grammar = Grammar::new(rules, sequences);

        assert_eq!(grammar.rule("digit").unwrap().ordinal(), 2);
        assert_eq!(grammar.rule("nope").unwrap_err(), Error::UnknownRule("nope".to_owned()));
        assert_eq!(grammar.sequence("num").unwrap().sections.len(), 1);
        assert_eq!(grammar.sequence("nope").unwrap_err(), Error::UnknownSequence("nope".to_owned()));
        assert!(grammar.is_token("digit"));
        assert!(grammar.is_sequence("num"));
        assert!(grammar.parse("042", Target::Sequence("num"), CheckOptions::default()).is_match());
    }
}
