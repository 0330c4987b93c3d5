//! A tiny arithmetic grammar declared as data.
//!
//! expr = num , { plus , num } ;

use parsegen::{
    Check, CheckOptions, Grammar, RuleDecl, RuleTable, SequenceDecl, SequenceTable, Target,
};

const RULES: &str = r#"{
    "digit": "char_in:0123456789",
    "plus": "char:+",
    "num": "repeat:digit"
}"#;

const SEQUENCES: &str = r#"{
    "expr": {
        "sequence": [
            { "tokenList": "num", "ebnfItem": "num" },
            { "sequenceList": "tail", "ebnfItem": "{ plus , num }",
              "isOptional": true, "isRepeating": true }
        ]
    },
    "tail": {
        "sequence": [
            { "tokenList": "plus", "ebnfItem": "plus" },
            { "tokenList": "num", "ebnfItem": "num", "varName": "operand" }
        ]
    }
}"#;

type Document = serde_json::Map<String, serde_json::Value>;

fn grammar() -> Grammar {
    let rules: Vec<(String, RuleDecl)> = serde_json::from_str::<Document>(RULES)
        .unwrap()
        .into_iter()
        .map(|(name, value)| (name, serde_json::from_value(value).unwrap()))
        .collect();
    let sequences: Vec<(String, SequenceDecl)> =
        serde_json::from_str::<Document>(SEQUENCES)
            .unwrap()
            .into_iter()
            .map(|(name, value)| (name, serde_json::from_value(value).unwrap()))
            .collect();

    let rules = RuleTable::build(rules.iter().map(|(n, d)| (n.as_str(), d))).unwrap();
    let sequences = SequenceTable::build(sequences.iter().map(|(n, d)| (n.as_str(), d)));
    Grammar::new(rules, sequences)
}

fn leaves(tree: &parsegen::ParseTree, name: &str) -> Vec<String> {
    tree.find_all(name).map(|id| tree.text(id)).collect()
}

#[test]
fn single_number() {
    let g = grammar();
    let check = g.parse("7", Target::Sequence("expr"), CheckOptions::default());
    let tree = check.tree().unwrap();
    assert_eq!(leaves(tree, "num"), vec!["7"]);
    assert!(leaves(tree, "plus").is_empty());
}

#[test]
fn sum() {
    let g = grammar();
    let tree = g
        .parse("12+3+45", Target::Sequence("expr"), CheckOptions::default())
        .into_tree()
        .unwrap();

    assert_eq!(leaves(&tree, "num"), vec!["12", "3", "45"]);
    assert_eq!(leaves(&tree, "plus"), vec!["+", "+"]);
    assert_eq!(tree.text(tree.root()), "12+3+45");

    let operands: Vec<String> = tree
        .iter()
        .filter(|(_, n)| n.variable_name.as_deref() == Some("operand"))
        .filter_map(|(_, n)| n.variable_value.clone())
        .collect();
    assert_eq!(operands, vec!["3", "45"]);
}

#[test]
fn trailing_operator_does_not_match() {
    let g = grammar();
    let tests = vec!["12+", "+1", "1++2"];
    for test in tests {
        let check = g.parse(test, Target::Sequence("expr"), CheckOptions::default());
        assert!(
            matches!(check, Check::Unmatched { .. }),
            "test case: {:?}, got {:?}",
            test,
            check
        );
    }
}

#[test]
fn check_all_sequences() {
    let g = grammar();
    let tree = g
        .parse("1+2", Target::All, CheckOptions::default())
        .into_tree()
        .unwrap();
    assert_eq!(tree.node(tree.root()).name, "expr");

    let tree = g
        .parse("+2", Target::All, CheckOptions::default())
        .into_tree()
        .unwrap();
    assert_eq!(tree.node(tree.root()).name, "tail");
}
