use ebnf::{Class, Containment, GroupKind, Production};
use parsegen::{Grammar, ParserSequence, Rule, RuleKind, SequenceSection};

use super::Bootstrapper;
use crate::error::{Error, Result};

/// Rules and sequences derived from one production, not yet part of any
/// grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Staged {
    /// Name of the production, and of the sequence it becomes.
    pub name: String,
    pub rules: Vec<Rule>,
    pub sequences: Vec<ParserSequence>,
}

impl Staged {
    fn new(name: &str) -> Self {
        Staged {
            name: name.to_owned(),
            rules: Vec::new(),
            sequences: Vec::new(),
        }
    }

    pub fn sequence(&self, name: &str) -> Option<&ParserSequence> {
        self.sequences.iter().find(|s| s.name == name)
    }

    /// Add everything to `grammar`, replacing rules and sequences that share
    /// a name.
    pub fn commit(self, grammar: &mut Grammar) {
        for rule in self.rules {
            log::debug!("adding rule '{}'", rule.name);
            grammar.rules.insert(rule);
        }
        for seq in self.sequences {
            log::debug!("adding sequence '{}' with {} sections", seq.name, seq.sections.len());
            grammar.sequences.insert(seq);
        }
    }

    /// Names already known as tokens are token references. Everything else,
    /// including names nobody has declared yet, is a sequence reference.
    fn classify(&self, grammar: &Grammar, name: &str) -> Class {
        if grammar.is_token(name) || self.rules.iter().any(|r| r.name == name) {
            return Class::Token;
        }
        if !grammar.is_sequence(name) && self.sequence(name).is_none() {
            log::debug!("'{}' is not declared yet, treating it as a sequence", name);
        }
        Class::Sequence
    }

    fn sections(&self, grammar: &Grammar, text: &str) -> Result<Vec<SequenceSection>> {
        ebnf::build_sections(text, |name| self.classify(grammar, name))
            .map_err(|e| Error::GrammarSynthesis(format!("'{}': {}", text, e)))
    }
}

/// Replace the first occurrence of `from` in `text`.
fn replace_first(text: &mut String, from: &str, to: &str) -> bool {
    match text.find(from) {
        Some(at) => {
            text.replace_range(at..at + from.len(), to);
            true
        }
        None => false,
    }
}

pub fn synthesize(meta: &Bootstrapper, grammar: &Grammar, production: &Production) -> Result<Staged> {
    let lhs = production.lhs.as_str();
    let groups =
        ebnf::groups(&production.rhs).map_err(|e| Error::GrammarSyntax(format!("{}: {}", production, e)))?;

    let mut staged = Staged::new(lhs);
    let mut containment = Containment::new(&groups);
    // Current text of every group, shrinking as nested groups are replaced.
    let mut texts: Vec<String> = groups.iter().map(|g| g.text.clone()).collect();
    let mut top = production.rhs.clone();

    loop {
        let batch = containment.leaves();
        if batch.is_empty() {
            break;
        }
        log::debug!("synthesizing {} group(s) of '{}'", batch.len(), lhs);

        for i in batch {
            let group = &groups[i];
            let id = group.identifier(lhs);
            let text = texts[i].clone();

            match group.kind {
                GroupKind::Terminal => {
                    let literal = group.kind.strip(&text);
                    if literal.is_empty() {
                        return Err(Error::GrammarSynthesis(format!("empty terminal in '{}'", production)));
                    }
                    staged.rules.push(Rule::new(&id, RuleKind::String(literal.to_owned())));
                    staged
                        .sequences
                        .push(ParserSequence::new(&id, vec![SequenceSection::tokens(vec![&id])]));
                }
                _ => {
                    let sections = staged.sections(grammar, group.kind.strip(&text))?;
                    staged.sequences.push(ParserSequence::new(&id, sections));
                }
            }

            let reference = format!("{}{}", id, group.kind.suffix());
            let containing: Vec<usize> = containment.contained_by(i).iter().copied().collect();
            for j in containing {
                if !replace_first(&mut texts[j], &text, &reference) {
                    return Err(Error::GrammarSynthesis(format!(
                        "'{}' not found in containing group '{}'",
                        text, texts[j]
                    )));
                }
            }
            if !replace_first(&mut top, &text, &reference) {
                return Err(Error::GrammarSynthesis(format!("'{}' not found in '{}'", text, top)));
            }
            containment.finish(i);
        }

        let rewritten = Production::new(lhs, top.as_str()).to_string();
        if meta.parse_rule(&rewritten).is_none() {
            return Err(Error::GrammarSynthesis(format!("rewritten rule does not parse: {}", rewritten)));
        }
    }

    let sections = staged.sections(grammar, &top)?;
    staged.sequences.push(ParserSequence::new(lhs, sections));
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsegen::{CheckOptions, RuleTable};

    use crate::bootstrap::builtin_rules;

    fn grammar() -> Grammar {
        let builtin = builtin_rules();
        Grammar::new(RuleTable::build(builtin.iter()).unwrap(), Default::default())
    }

    fn bootstrapper() -> Bootstrapper {
        Bootstrapper::new(CheckOptions::default()).unwrap()
    }

    #[test]
    fn plain_references() {
        let g = grammar();
        let staged = bootstrapper().synthesize(&g, "pair = digit, letter | other;").unwrap();

        assert!(staged.rules.is_empty());
        assert_eq!(
            staged.sequences,
            vec![ParserSequence::new(
                "pair",
                vec![
                    SequenceSection {
                        ebnf_item: "digit".to_owned(),
                        ..SequenceSection::tokens(vec!["digit"])
                    },
                    SequenceSection {
                        tokens: vec!["letter".to_owned()],
                        sequences: vec!["other".to_owned()],
                        ebnf_item: "letter|other".to_owned(),
                        ..Default::default()
                    },
                ],
            )]
        );
    }

    #[test]
    fn nested_groups() {
        let g = grammar();
        let staged = bootstrapper()
            .synthesize(&g, "ruleExpr = ruleNum, {('+', ruleNum)};")
            .unwrap();

        assert_eq!(
            staged.rules,
            vec![Rule::new("ruleExpr:::terminal:2:2", RuleKind::String("+".to_owned()))]
        );
        let names: Vec<&str> = staged.sequences.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "ruleExpr:::terminal:2:2",
                "ruleExpr:::group:1:1",
                "ruleExpr:::repeat:0:0",
                "ruleExpr",
            ]
        );

        let group = staged.sequence("ruleExpr:::group:1:1").unwrap();
        assert_eq!(group.sections[0].tokens, vec!["ruleExpr:::terminal:2:2".to_owned()]);
        assert_eq!(group.sections[1].sequences, vec!["ruleNum".to_owned()]);

        let top = staged.sequence("ruleExpr").unwrap();
        assert_eq!(top.sections.len(), 2);
        assert_eq!(top.sections[1].sequences, vec!["ruleExpr:::repeat:0:0".to_owned()]);
        assert!(top.sections[1].is_optional && top.sections[1].is_repeating);
        assert_eq!(top.sections[1].ebnf_item, "ruleExpr:::repeat:0:0/Opt/Rep");
    }

    #[test]
    fn repeating_marker() {
        let g = grammar();
        let staged = bootstrapper().synthesize(&g, "ruleNum = %% digit %%;").unwrap();

        let inner = staged.sequence("ruleNum:::repeating:0:0").unwrap();
        assert_eq!(inner.sections[0].tokens, vec!["digit".to_owned()]);
        let top = staged.sequence("ruleNum").unwrap();
        assert!(top.sections[0].is_repeating);
        assert!(!top.sections[0].is_optional);
    }

    #[test]
    fn synthesis_errors() {
        let g = grammar();
        let b = bootstrapper();
        let tests = vec!["a = ;", "a = b", "= b;", "a = 'b;"];
        for test in tests {
            let res = b.synthesize(&g, test);
            assert!(matches!(res, Err(Error::GrammarSyntax(_))), "test case: {:?}", test);
        }

        let tests = vec!["a = '';", "a = ();", "a = [b,];"];
        for test in tests {
            let res = b.synthesize(&g, test);
            assert!(matches!(res, Err(Error::GrammarSynthesis(_))), "test case: {:?}", test);
        }
    }

    #[test]
    fn commit_adds_everything() {
        let mut g = grammar();
        let staged = bootstrapper().synthesize(&g, "sum = digit, {'+', digit};").unwrap();
        assert!(!g.is_sequence("sum"));

        staged.commit(&mut g);
        assert!(g.is_sequence("sum"));
        assert!(g.is_token("sum:::terminal:1:1"));
        assert!(g
            .parse("1+2+3", parsegen::Target::Sequence("sum"), CheckOptions::default())
            .is_match());
    }
}
