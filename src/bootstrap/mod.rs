//! Growing a grammar from EBNF text, using the engine's own parser.
//!
//! A production such as `expr = num, {('+', num)};` is first matched against
//! the `rule` meta-grammar. Its bracket groups and terminals are then turned
//! into generated rules and sequences, innermost first, until the right hand
//! side is a plain list of references.

mod meta;
mod synth;

pub use meta::{builtin_rules, meta_grammar, meta_rules, LHS, RHS, RULE};
pub use synth::Staged;

use ebnf::Production;
use parsegen::{Check, CheckOptions, Grammar, Target};

use crate::error::{Error, Result};

pub struct Bootstrapper {
    meta: Grammar,
    options: CheckOptions,
}

impl Bootstrapper {
    pub fn new(options: CheckOptions) -> Result<Self> {
        Ok(Bootstrapper {
            meta: meta_grammar()?,
            options,
        })
    }

    /// Match compacted rule text against the meta-grammar and pull out its
    /// two sides.
    ///
    /// Terminal contents are masked for the match, since the meta-grammar
    /// only knows printable ASCII inside quotes. Both sides are then taken
    /// from the unmasked text.
    pub fn parse_rule(&self, text: &str) -> Option<Production> {
        let masked = meta::mask_terminals(text);
        let check = self.meta.parse(&masked, Target::Sequence(RULE), self.options);
        let tree = match check {
            Check::Matched(tree) => tree,
            _ => return None,
        };
        let lhs = tree.find_variable(LHS)?.variable_value.clone()?;
        tree.find_variable(RHS)?;
        // A full match is exactly `lhs=rhs;` and `lhs` is ASCII.
        let rhs = text.get(lhs.len() + 1..text.len().checked_sub(1)?)?;
        Some(Production::new(lhs, rhs))
    }

    /// Derive the rules and sequences `text` describes without touching
    /// `grammar`.
    pub fn synthesize(&self, grammar: &Grammar, text: &str) -> Result<Staged> {
        let text = ebnf::compact(text);
        let production = self
            .parse_rule(&text)
            .ok_or_else(|| Error::GrammarSyntax(text.clone()))?;
        synth::synthesize(self, grammar, &production)
    }

    /// Add the production in `text` to `grammar`, returning its name. Nothing
    /// is added unless every generated rule and sequence could be built.
    pub fn add_rule(&self, grammar: &mut Grammar, text: &str) -> Result<String> {
        let staged = self.synthesize(grammar, text)?;
        let name = staged.name.clone();
        staged.commit(grammar);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rule() {
        let b = Bootstrapper::new(CheckOptions::default()).unwrap();
        let tests = vec![
            ("a=b;", Some(Production::new("a", "b"))),
            ("ruleNum=%%digit%%;", Some(Production::new("ruleNum", "%%digit%%"))),
            ("x='a b',y;", Some(Production::new("x", "'a b',y"))),
            ("x='→',\"\t\";", Some(Production::new("x", "'→',\"\t\""))),
            ("x=a:::group:0:1/Opt;", Some(Production::new("x", "a:::group:0:1/Opt"))),
            ("a=b", None),
            ("a b;", None),
        ];

        for test in tests {
            assert_eq!(b.parse_rule(test.0), test.1, "test case: {:?}", test);
        }
    }
}
