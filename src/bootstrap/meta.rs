//! The built-in rule document and the `rule` meta-grammar that reads EBNF
//! productions.

use parsegen::{Grammar, ParserSequence, RuleDecl, RuleTable, SequenceSection, SequenceTable};

use crate::config::RuleDocument;
use crate::error::Result;

/// Name of the meta sequence matching `identifier "=" rhs ";"`.
pub const RULE: &str = "rule";
/// Variables captured by [`RULE`].
pub const LHS: &str = "lhs";
pub const RHS: &str = "rhs";

/// Tokens that may appear in a right hand side outside of terminals.
const RHS_TOKENS: &[&str] = &[
    "metaIdentifier",
    "comma",
    "pipe",
    "optionalOpen",
    "optionalClose",
    "repeatOpen",
    "repeatClose",
    "groupOpen",
    "groupClose",
    "repeatMarker",
    "sequenceMarker",
    "tokenMarker",
];

fn printable_except(excluded: char) -> String {
    (' '..='~').filter(|&c| c != excluded).collect()
}

/// Rules every engine starts with. User documents are declared after these
/// and replace them by name.
pub fn builtin_rules() -> RuleDocument {
    RuleDocument::new()
        .with("letter", "char_in:abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ")
        .with("digit", "char_in:0123456789")
        .with(
            "identifierChar",
            RuleDecl::Collection(
                ["rule:letter", "rule:digit", "char:_"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        )
        .with("identifier", "repeat:identifierChar")
        .with("whitespace", "char_in: \t\r\n")
        .with("equals", "char:=")
        .with("semicolon", "char:;")
        .with("comma", "char:,")
        .with("pipe", "char:|")
        .with("optionalOpen", "char:[")
        .with("optionalClose", "char:]")
        .with("repeatOpen", "char:{")
        .with("repeatClose", "char:}")
        .with("groupOpen", "char:(")
        .with("groupClose", "char:)")
        .with("repeatMarker", "string:%%")
        .with("sequenceMarker", "char:&")
        .with("tokenMarker", "char:@")
        .with("doubleQuote", "char:\"")
        .with("singleQuote", "char:'")
        .with(
            "doubleQuotedChar",
            RuleDecl::Token(format!("char_in:{}", printable_except('"'))),
        )
        .with(
            "singleQuotedChar",
            RuleDecl::Token(format!("char_in:{}", printable_except('\''))),
        )
}

/// The built-in rules plus the rules only the meta-grammar needs. Generated
/// names such as `expr:::group:1:0/Opt` are read as one `metaIdentifier`.
pub fn meta_rules() -> RuleDocument {
    builtin_rules()
        .with(
            "metaIdentifierChar",
            RuleDecl::Collection(
                ["rule:identifierChar", "char::", "char:/"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        )
        .with("metaIdentifier", "repeat:metaIdentifierChar")
}

/// Replace every character inside a quoted terminal that the quoted-char
/// rules do not cover with `_`. Quotes and everything outside them are kept,
/// so the result has the same shape as `text`.
pub fn mask_terminals(text: &str) -> String {
    let mut quote: Option<char> = None;
    text.chars()
        .map(|c| match quote {
            Some(q) if c == q => {
                quote = None;
                c
            }
            Some(_) if !(' '..='~').contains(&c) => '_',
            Some(_) => c,
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                c
            }
        })
        .collect()
}

fn quoted_terminal(name: &str, quote: &str, inner: &str) -> ParserSequence {
    ParserSequence::new(
        name,
        vec![
            SequenceSection::tokens(vec![quote]),
            SequenceSection::tokens(vec![inner]).optional().repeating(),
            SequenceSection::tokens(vec![quote]),
        ],
    )
}

pub fn meta_sequences() -> SequenceTable {
    let mut rhs = SequenceSection::tokens(RHS_TOKENS.iter().copied()).repeating();
    rhs.sequences.push("terminal".to_owned());

    let mut table = SequenceTable::new();
    table.insert(ParserSequence::new(
        RULE,
        vec![
            SequenceSection::tokens(vec!["identifier"]).capture(LHS),
            SequenceSection::tokens(vec!["equals"]),
            SequenceSection::sequences(vec!["rhs"]).capture(RHS),
            SequenceSection::tokens(vec!["semicolon"]),
        ],
    ));
    table.insert(ParserSequence::new("rhs", vec![rhs]));
    table.insert(ParserSequence::new(
        "terminal",
        vec![SequenceSection::sequences(vec![
            "doubleQuotedTerminal",
            "singleQuotedTerminal",
        ])],
    ));
    table.insert(quoted_terminal("doubleQuotedTerminal", "doubleQuote", "doubleQuotedChar"));
    table.insert(quoted_terminal("singleQuotedTerminal", "singleQuote", "singleQuotedChar"));
    table
}

pub fn meta_grammar() -> Result<Grammar> {
    let doc = meta_rules();
    let rules = RuleTable::build(doc.iter())?;
    Ok(Grammar::new(rules, meta_sequences()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsegen::{CheckOptions, Target};

    #[test]
    fn builtin_rules_resolve() {
        let builtin = builtin_rules();
        let mut rules = RuleTable::build(builtin.iter()).unwrap();
        assert!(rules.resolve().is_empty());

        let quoted = rules.by_name("singleQuotedChar").unwrap();
        assert!(quoted.evaluate_char(' ', &rules));
        assert!(quoted.evaluate_char('"', &rules));
        assert!(!quoted.evaluate_char('\'', &rules));
        let identifier = rules.by_name("identifier").unwrap();
        assert!(identifier.evaluate_str("key_1", &rules));
        assert!(!identifier.evaluate_str("key:value", &rules));
        assert!(!identifier.evaluate_str("a/b", &rules));
        assert!(rules.by_name("metaIdentifier").is_none());
    }

    #[test]
    fn meta_rules_read_generated_names() {
        let doc = meta_rules();
        let mut rules = RuleTable::build(doc.iter()).unwrap();
        assert!(rules.resolve().is_empty());
        let meta = rules.by_name("metaIdentifier").unwrap();
        assert!(meta.evaluate_str("a:::group:1:0/Opt/Rep", &rules));
        assert!(!meta.evaluate_str("a,b", &rules));
    }

    #[test]
    fn mask_quoted_text() {
        let tests = vec![
            ("a=b;", "a=b;"),
            ("a='→',\"\t\";", "a='_',\"_\";"),
            ("a='x\"→';", "a='x\"_';"),
            ("a=\"it's→\",→;", "a=\"it's_\",→;"),
        ];
        for test in tests {
            assert_eq!(mask_terminals(test.0), test.1, "test case: {:?}", test);
        }
    }

    #[test]
    fn meta_grammar_accepts_rules() {
        let meta = meta_grammar().unwrap();
        let tests = vec![
            ("a=b;", true),
            ("htmlTagName=htmlIdentifier;", true),
            ("ruleNum=%%digit%%;", true),
            ("ruleExpr=ruleNum,{('+',ruleNum)};", true),
            ("x=\"a b\"|'it\"s'|&y|@z;", true),
            ("x=[a:::group:0:1/Opt];", true),
            ("x='';", true),
            ("x=;", false),
            ("x=a", false),
            ("=a;", false),
            ("x=a;;", false),
            ("x='a;", false),
        ];

        for test in tests {
            let check = meta.parse(test.0, Target::Sequence(RULE), CheckOptions::default());
            assert_eq!(check.is_match(), test.1, "test case: {:?}", test);
        }
    }

    #[test]
    fn meta_grammar_captures_sides() {
        let meta = meta_grammar().unwrap();
        let check = meta.parse(
            "expr=num,{('+',num)};",
            Target::Sequence(RULE),
            CheckOptions::default(),
        );
        let tree = check.into_tree().unwrap();
        assert_eq!(
            tree.find_variable(LHS).and_then(|n| n.variable_value.as_deref()),
            Some("expr")
        );
        assert_eq!(
            tree.find_variable(RHS).and_then(|n| n.variable_value.as_deref()),
            Some("num,{('+',num)}")
        );
    }
}
