//! Backtracking evaluation of sequences against an organized span forest.

use std::cell::Cell;

use crate::rule::{RuleId, RuleTable};
use crate::sequence::{ParserSequence, SequenceSection, SequenceTable};
use crate::span::{forest_end, Span};
use crate::tree::{ParseTree, ParserResult};

pub const DEFAULT_MAX_LEVEL: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Deepest recursion allowed before the whole check is cancelled.
    pub max_level: usize,
    /// Emit a trace of every section and sequence attempt at `trace` level.
    pub verbose: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            max_level: DEFAULT_MAX_LEVEL,
            verbose: false,
        }
    }
}

/// Which sequences a check should try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'n> {
    Sequence(&'n str),
    All,
}

/// Outcome of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Matched(ParseTree),
    /// No candidate consumed the whole input. Carries the tree of the
    /// candidate that got furthest, if any candidate was evaluated.
    Unmatched { partial: Option<ParseTree> },
    /// Recursion went past `max_level` and every frame was unwound.
    RecursionLimitExceeded,
}

impl Check {
    pub fn is_match(&self) -> bool {
        matches!(self, Check::Matched(_))
    }

    pub fn tree(&self) -> Option<&ParseTree> {
        match self {
            Check::Matched(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn into_tree(self) -> Option<ParseTree> {
        match self {
            Check::Matched(tree) => Some(tree),
            _ => None,
        }
    }
}

/// Result of evaluating a section: where evaluation continues from and what
/// was matched.
#[derive(Debug)]
struct SectionMatch {
    index: usize,
    results: Vec<ParserResult>,
}

/// Result of evaluating a sequence. The result is kept even when the
/// sequence was not found so a partial tree can be reported.
#[derive(Debug)]
struct SequenceMatch {
    found: bool,
    index: usize,
    result: ParserResult,
}

/// Evaluation state for a single check.
///
/// The cancellation flag lives here rather than anywhere global, so checks
/// running side by side never see each other's cancellation.
pub struct State<'a> {
    rules: &'a RuleTable,
    sequences: &'a SequenceTable,
    spans: &'a [Span],
    options: CheckOptions,
    cancelled: Cell<bool>,
}

impl<'a> State<'a> {
    pub fn new(
        rules: &'a RuleTable,
        sequences: &'a SequenceTable,
        spans: &'a [Span],
        options: CheckOptions,
    ) -> Self {
        State {
            rules,
            sequences,
            spans,
            options,
            cancelled: Cell::new(false),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Evaluate the target sequences from the start of the input. A sequence
    /// is accepted only if it consumes the input up to the end of the span
    /// forest. The first accepted sequence wins.
    pub fn check(&self, target: Target<'_>) -> Check {
        let end = forest_end(self.spans);
        let candidates: Vec<&ParserSequence> = match target {
            Target::Sequence(name) => match self.sequences.get(name) {
                Some(seq) => vec![seq],
                None => {
                    log::warn!("check against unknown sequence '{}'", name);
                    Vec::new()
                }
            },
            Target::All => self.sequences.iter().collect(),
        };

        let mut furthest: Option<SequenceMatch> = None;
        for seq in candidates {
            let eval = self.evaluate_sequence(seq, 0, 0);
            if self.is_cancelled() {
                log::debug!("check cancelled at level {}", self.options.max_level);
                return Check::RecursionLimitExceeded;
            }
            if eval.found && eval.index == end {
                return Check::Matched(ParseTree::organize_parent_links(eval.result));
            }
            self.trace(0, || {
                format!(
                    "'{}' rejected: found={}, stopped at {} of {}",
                    seq.name, eval.found, eval.index, end
                )
            });
            if furthest.as_ref().map_or(true, |f| eval.index > f.index) {
                furthest = Some(eval);
            }
        }

        Check::Unmatched {
            partial: furthest.map(|f| ParseTree::organize_parent_links(f.result)),
        }
    }

    /// Mark the check cancelled if `level` is past the ceiling. Returns true
    /// if evaluation must stop.
    fn should_stop(&self, level: usize) -> bool {
        if level > self.options.max_level {
            self.cancelled.set(true);
        }
        self.is_cancelled()
    }

    fn evaluate_sequence(&self, seq: &ParserSequence, index: usize, level: usize) -> SequenceMatch {
        let mut result = ParserResult::node(&seq.name, level);
        if self.should_stop(level) {
            return SequenceMatch {
                found: false,
                index,
                result,
            };
        }

        self.trace(level, || format!("sequence '{}' at {}", seq.name, index));

        let (mandatory, optional) = seq.section_balance();
        let mut found = true;
        let mut cursor = index;
        for section in &seq.sections {
            match self.evaluate_section(seq, section, cursor, level) {
                Some(matched) => {
                    cursor = matched.index;
                    result.inner_results.extend(matched.results);
                }
                None => {
                    found = false;
                    if self.is_cancelled() {
                        break;
                    }
                    // A failed section only stops the sequence early when
                    // mandatory sections outnumber optional ones; otherwise
                    // the remaining sections are still evaluated.
                    if !section.is_repeating && mandatory > optional {
                        break;
                    }
                }
            }
        }

        self.trace(level, || {
            format!("sequence '{}' found={} end={}", seq.name, found, cursor)
        });
        SequenceMatch {
            found,
            index: cursor,
            result,
        }
    }

    /// `None` if the section failed. An optional section that matched
    /// nothing succeeds without moving the index.
    fn evaluate_section(
        &self,
        seq: &ParserSequence,
        section: &SequenceSection,
        index: usize,
        level: usize,
    ) -> Option<SectionMatch> {
        if self.should_stop(level) {
            return None;
        }

        let mut cursor = index;
        let mut results = Vec::new();
        while let Some((next, mut result)) = self.match_once(section, cursor, level) {
            if let Some(variable) = &section.variable_name {
                result.capture(variable);
            }
            results.push(result);
            let advanced = next > cursor;
            cursor = next;
            if !section.is_repeating || !advanced {
                break;
            }
        }

        if self.is_cancelled() {
            return None;
        }
        if !results.is_empty() {
            return Some(SectionMatch {
                index: cursor,
                results,
            });
        }

        self.trace(level, || {
            format!(
                "section '{}' of '{}' missed at {} (optional={})",
                section.ebnf_item, seq.name, index, section.is_optional
            )
        });
        if section.is_optional {
            Some(SectionMatch {
                index,
                results: Vec::new(),
            })
        } else {
            None
        }
    }

    /// Try every alternative of a section once at `index`: tokens first, then
    /// sequences, first match wins.
    fn match_once(
        &self,
        section: &SequenceSection,
        index: usize,
        level: usize,
    ) -> Option<(usize, ParserResult)> {
        for name in &section.tokens {
            let rule = match self.rules.id(name) {
                Some(rule) => rule,
                None => {
                    log::warn!("section references unknown token '{}'", name);
                    continue;
                }
            };
            if let Some(span) = find_token(self.spans, rule, index) {
                self.trace(level, || format!("token '{}' matched '{}' at {}", name, span.text, index));
                let leaf = ParserResult::leaf(name, span.clone(), level);
                return Some((span.end(), leaf));
            }
        }

        for name in &section.sequences {
            let seq = match self.sequences.get(name) {
                Some(seq) => seq,
                None => {
                    log::warn!("section references unknown sequence '{}'", name);
                    continue;
                }
            };
            let eval = self.evaluate_sequence(seq, index, level + 1);
            if self.is_cancelled() {
                return None;
            }
            if eval.found {
                return Some((eval.index, eval.result));
            }
        }

        None
    }

    fn trace<F>(&self, level: usize, message: F)
    where
        F: FnOnce() -> String,
    {
        if self.options.verbose {
            log::trace!("{:indent$}{}", "", message(), indent = level * 2);
        }
    }
}

/// Find a span of `rule` starting exactly at `index`, looking through every
/// span that covers `index` and the spans nested inside them. Larger spans
/// are found before the spans they contain.
pub fn find_token(spans: &[Span], rule: RuleId, index: usize) -> Option<&Span> {
    for span in spans.iter().filter(|s| s.covers(index)) {
        if span.start == index && span.rule == rule {
            return Some(span);
        }
        if let Some(found) = find_token(&span.inner_spans, rule, index) {
            return Some(found);
        }
    }
    None
}
