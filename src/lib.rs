//! A lexing and parsing engine whose grammar is data, and which can grow that
//! grammar at runtime from EBNF text parsed by itself.
//!
//! ```no_run
//! use bootgram::{Engine, EngineConfig, RuleDocument, SequenceDocument};
//!
//! let engine = Engine::with_builtin(&RuleDocument::new(), &SequenceDocument::new(), EngineConfig::default())?;
//! engine.add_ebnf_rule("num = %% digit %%;")?;
//! engine.add_ebnf_rule("sum = num, {'+', num};")?;
//! assert!(engine.parse("1+22+333", Some("sum")).is_match());
//! # Ok::<(), bootgram::Error>(())
//! ```

use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Context;
use parsegen::{Grammar, ParserSequence, RuleTable, SequenceTable, Span, Target};
use tokio::task::JoinHandle;

pub mod bootstrap;
pub mod config;
mod error;

pub use bootstrap::Bootstrapper;
pub use config::{EngineConfig, RuleDocument, SequenceDocument};
pub use error::{Error, Result};
pub use parsegen::{Check, ParseTree};

/// Rule and sequence tables plus the bootstrapper that extends them.
///
/// Lexing and checking share the tables, adding rules takes them exclusively.
pub struct Engine {
    grammar: RwLock<Grammar>,
    bootstrapper: Bootstrapper,
    config: EngineConfig,
}

impl Engine {
    /// Build an engine from a built-in and a user rule document. User rules
    /// replace built-in rules of the same name.
    pub fn new(
        builtin: &RuleDocument,
        user: &RuleDocument,
        sequences: &SequenceDocument,
        config: EngineConfig,
    ) -> Result<Self> {
        let mut rules = RuleTable::new();
        rules.declare(builtin.iter())?;
        rules.declare(user.iter())?;
        rules.resolve();

        let sequences = SequenceTable::build(sequences.iter());
        log::debug!(
            "engine built with {} rules and {} sequences",
            rules.len(),
            sequences.len()
        );

        Ok(Engine {
            grammar: RwLock::new(Grammar::new(rules, sequences)),
            bootstrapper: Bootstrapper::new(config.options())?,
            config,
        })
    }

    /// Build an engine on top of [`bootstrap::builtin_rules`].
    pub fn with_builtin(
        user: &RuleDocument,
        sequences: &SequenceDocument,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::new(&bootstrap::builtin_rules(), user, sequences, config)
    }

    pub fn from_json(rules: &str, sequences: &str, config: EngineConfig) -> Result<Self> {
        let rules: RuleDocument = rules.parse()?;
        let sequences: SequenceDocument = sequences.parse()?;
        Self::with_builtin(&rules, &sequences, config)
    }

    pub fn from_files<P, Q>(rules: P, sequences: Q, config: EngineConfig) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let read = |path: &Path| {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        };
        let rules = read(rules.as_ref())?;
        let sequences = read(sequences.as_ref())?;
        Ok(Self::from_json(&rules, &sequences, config)?)
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, Grammar> {
        self.grammar.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Grammar> {
        self.grammar.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Declare more rules. Either all of them are added or none are.
    pub fn declare_rules(&self, doc: &RuleDocument) -> Result<()> {
        let mut grammar = self.write();
        grammar.rules.declare(doc.iter())?;
        grammar.rules.resolve();
        Ok(())
    }

    pub fn declare_sequences(&self, doc: &SequenceDocument) {
        self.write().sequences.declare(doc.iter());
    }

    pub fn lex(&self, input: &str) -> Vec<Span> {
        self.read().lex(input)
    }

    pub fn lex_all<S: AsRef<str>>(&self, inputs: &[S]) -> Vec<Vec<Span>> {
        let grammar = self.read();
        parsegen::Lexer::new(&grammar.rules).lex_all(inputs)
    }

    /// Check lexed input against one sequence, or every sequence in
    /// declaration order when `sequence` is `None`.
    pub fn check(&self, spans: &[Span], sequence: Option<&str>) -> Check {
        let target = sequence.map_or(Target::All, Target::Sequence);
        self.read().check(spans, target, self.config.options())
    }

    pub fn parse(&self, input: &str, sequence: Option<&str>) -> Check {
        let target = sequence.map_or(Target::All, Target::Sequence);
        self.read().parse(input, target, self.config.options())
    }

    /// Extend the grammar with one EBNF production such as
    /// `htmlTagName = htmlIdentifier;`. Returns the name of the new sequence.
    pub fn add_ebnf_rule(&self, text: &str) -> Result<String> {
        let mut grammar = self.write();
        let name = self.bootstrapper.add_rule(&mut grammar, text)?;
        log::debug!("added '{}' from EBNF", name);
        Ok(name)
    }

    pub fn sequence(&self, name: &str) -> parsegen::Result<ParserSequence> {
        self.read().sequence(name).cloned()
    }

    pub fn is_token(&self, name: &str) -> bool {
        self.read().is_token(name)
    }

    pub fn is_sequence(&self, name: &str) -> bool {
        self.read().is_sequence(name)
    }

    /// Re-organize a span forest on the blocking pool. Must be called from
    /// within a tokio runtime.
    pub fn reorganize_in_background(spans: Vec<Span>) -> JoinHandle<Vec<Span>> {
        tokio::task::spawn_blocking(move || parsegen::organize(spans))
    }

    /// A freshly organized copy of `spans`, or `None` if the background task
    /// did not complete.
    pub async fn diagnostic_forest(&self, spans: &[Span]) -> Option<Vec<Span>> {
        match Self::reorganize_in_background(spans.to_vec()).await {
            Ok(forest) => Some(forest),
            Err(err) => {
                log::debug!("diagnostic re-organization did not finish: {}", err);
                None
            }
        }
    }
}
