//! Turns an input string into an organized forest of spans.
//!
//! Generation tests every rule against the input and produces a flat list
//! of matches. Organization nests that list so each span owns exactly the
//! matches it contains.

use std::cmp::Ordering;

use crate::rule::{RuleKind, RuleTable};
use crate::span::Span;

pub struct Lexer<'a> {
    rules: &'a RuleTable,
}

impl<'a> Lexer<'a> {
    pub fn new(rules: &'a RuleTable) -> Self {
        Lexer { rules }
    }

    /// Lex one input into an organized span forest.
    pub fn lex(&self, input: &str) -> Vec<Span> {
        organize(self.generate(input))
    }

    /// Lex each input independently.
    pub fn lex_all<S: AsRef<str>>(&self, inputs: &[S]) -> Vec<Vec<Span>> {
        inputs.iter().map(|input| self.lex(input.as_ref())).collect()
    }

    /// Produce every raw match of every rule, sorted by start, then longest
    /// first, then highest ordinal first.
    pub fn generate(&self, input: &str) -> Vec<Span> {
        let chars: Vec<char> = input.chars().collect();
        let mut spans = Vec::new();
        let mut repeats = Vec::new();

        for (id, rule) in self.rules.iter() {
            let ordinal = rule.ordinal();
            match &rule.kind {
                RuleKind::String(lit) => {
                    spans.extend(
                        occurrences(&chars, lit, false)
                            .map(|start| Span::new(start, id, ordinal, lit_text(&chars, start, lit))),
                    );
                }
                RuleKind::CiString(lit) => {
                    spans.extend(
                        occurrences(&chars, lit, true)
                            .map(|start| Span::new(start, id, ordinal, lit_text(&chars, start, lit))),
                    );
                }
                RuleKind::Repeat { .. } => {
                    repeats.extend(single_char_matches(&chars, |c| {
                        rule.evaluate_char(c, self.rules)
                    })
                    .map(|(start, c)| Span::new(start, id, ordinal, c.to_string())));
                }
                _ => {
                    spans.extend(
                        single_char_matches(&chars, |c| rule.evaluate_char(c, self.rules))
                            .map(|(start, c)| Span::new(start, id, ordinal, c.to_string())),
                    );
                }
            }
        }

        spans.extend(merge_runs(repeats));
        spans.sort_by(by_position);
        spans
    }
}

fn single_char_matches<'c, F>(chars: &'c [char], f: F) -> impl Iterator<Item = (usize, char)> + 'c
where
    F: Fn(char) -> bool + 'c,
{
    chars
        .iter()
        .copied()
        .enumerate()
        .filter(move |(_, c)| f(*c))
}

/// Every start position where `lit` occurs, overlapping occurrences
/// included.
fn occurrences<'c>(
    chars: &'c [char],
    lit: &str,
    ignore_case: bool,
) -> impl Iterator<Item = usize> + 'c {
    let lit: Vec<char> = lit.chars().collect();
    let width = lit.len();
    let last = if width == 0 || width > chars.len() {
        0
    } else {
        chars.len() - width + 1
    };
    (0..last).filter(move |&start| {
        let window = &chars[start..start + width];
        if ignore_case {
            window
                .iter()
                .flat_map(|c| c.to_lowercase())
                .eq(lit.iter().flat_map(|c| c.to_lowercase()))
        } else {
            window == lit.as_slice()
        }
    })
}

/// The input text under an occurrence, which differs from the literal for
/// case-insensitive rules.
fn lit_text(chars: &[char], start: usize, lit: &str) -> String {
    chars[start..start + lit.chars().count()].iter().collect()
}

/// Collapse single character matches of the same repeat rule at consecutive
/// positions into one span per run.
fn merge_runs(mut singles: Vec<Span>) -> Vec<Span> {
    singles.sort_by(|a, b| a.rule.cmp(&b.rule).then(a.start.cmp(&b.start)));

    let mut runs: Vec<Span> = Vec::new();
    for span in singles {
        match runs.last_mut() {
            Some(run) if run.rule == span.rule && run.end() == span.start => {
                run.length += span.length;
                run.text.push_str(&span.text);
            }
            _ => runs.push(span),
        }
    }
    runs
}

/// Order used for raw span lists.
fn by_position(a: &Span, b: &Span) -> Ordering {
    a.start
        .cmp(&b.start)
        .then(b.length.cmp(&a.length))
        .then(b.ordinal.cmp(&a.ordinal))
        .then(a.rule.cmp(&b.rule))
}

/// Order used while nesting: largest and highest priority first. The rule
/// id makes the order total so the result never depends on input order.
fn by_priority(a: &Span, b: &Span) -> Ordering {
    b.length
        .cmp(&a.length)
        .then(b.ordinal.cmp(&a.ordinal))
        .then(a.start.cmp(&b.start))
        .then(a.rule.cmp(&b.rule))
}

/// Build the containment forest for a set of spans.
///
/// Any nesting already present in the input is flattened first, so
/// organizing an organized forest gives the same forest back.
pub fn organize(spans: Vec<Span>) -> Vec<Span> {
    let mut pool = Vec::new();
    flatten_into(spans, &mut pool);
    pool.sort_by(by_priority);

    let mut forest = nest(pool);
    sort_by_start(&mut forest);
    forest
}

fn flatten_into(spans: Vec<Span>, out: &mut Vec<Span>) {
    for mut span in spans {
        let inner = std::mem::take(&mut span.inner_spans);
        out.push(span);
        flatten_into(inner, out);
    }
}

/// `pool` must be sorted by priority. Partitioning keeps that order, so
/// every recursive call sees a sorted pool as well.
fn nest(mut pool: Vec<Span>) -> Vec<Span> {
    let mut forest = Vec::new();
    while !pool.is_empty() {
        let mut parent = pool.remove(0);
        let (inner, rest): (Vec<Span>, Vec<Span>) =
            pool.into_iter().partition(|span| parent.contains(span));
        pool = rest;
        parent.inner_spans = nest(inner);
        forest.push(parent);
    }
    forest
}

fn sort_by_start(spans: &mut [Span]) {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(by_priority(a, b)));
    for span in spans.iter_mut() {
        sort_by_start(&mut span.inner_spans);
    }
}
