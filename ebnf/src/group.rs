//! Bracketed groups and quoted terminals inside a rule's right hand side.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use parsegen::QUALIFIER_SEPARATOR;

use crate::error::{Error, Result};
use crate::parser::terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `[ ... ]`
    Optional,
    /// `{ ... }`
    Repeat,
    /// `( ... )`
    Group,
    /// `%% ... %%`
    Repeating,
    /// `"..."` or `'...'`
    Terminal,
}

impl GroupKind {
    pub fn is_optional(self) -> bool {
        matches!(self, GroupKind::Optional | GroupKind::Repeat)
    }

    pub fn is_repeating(self) -> bool {
        matches!(self, GroupKind::Repeat | GroupKind::Repeating)
    }

    fn open_len(self) -> usize {
        match self {
            GroupKind::Repeating => 2,
            _ => 1,
        }
    }

    /// Strip this kind's delimiters from `text`.
    pub fn strip(self, text: &str) -> &str {
        let open = self.open_len();
        &text[open..text.len() - open]
    }

    /// Flags appended to a reference that replaces a group of this kind.
    pub fn suffix(self) -> &'static str {
        match (self.is_optional(), self.is_repeating()) {
            (true, true) => "/Opt/Rep",
            (true, false) => "/Opt",
            (false, true) => "/Rep",
            (false, false) => "",
        }
    }
}

impl Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            GroupKind::Optional => "optional",
            GroupKind::Repeat => "repeat",
            GroupKind::Group => "group",
            GroupKind::Repeating => "repeating",
            GroupKind::Terminal => "terminal",
        };
        write!(f, "{}", label)
    }
}

/// One bracketed group or terminal. `start` and `end` are byte offsets into
/// the right hand side, `end` exclusive and delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    pub start: usize,
    pub end: usize,
    /// Number of groups open around this one.
    pub level: usize,
    /// Position of this group among all groups, ordered by start.
    pub ordinal: usize,
    pub text: String,
}

impl Group {
    /// The text between the delimiters.
    pub fn inner(&self) -> &str {
        self.kind.strip(&self.text)
    }

    pub fn contains(&self, other: &Group) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Generated name for this group within the rule `lhs`, e.g.
    /// `expr:::group:1:0`.
    pub fn identifier(&self, lhs: &str) -> String {
        format!(
            "{}{}{}:{}:{}",
            lhs, QUALIFIER_SEPARATOR, self.kind, self.level, self.ordinal
        )
    }
}

fn closing(c: char) -> Option<GroupKind> {
    match c {
        ']' => Some(GroupKind::Optional),
        '}' => Some(GroupKind::Repeat),
        ')' => Some(GroupKind::Group),
        _ => None,
    }
}

fn opening(c: char) -> Option<GroupKind> {
    match c {
        '[' => Some(GroupKind::Optional),
        '{' => Some(GroupKind::Repeat),
        '(' => Some(GroupKind::Group),
        _ => None,
    }
}

struct Scanner<'a> {
    rhs: &'a str,
    found: Vec<Group>,
    open: Vec<(GroupKind, usize)>,
}

impl<'a> Scanner<'a> {
    fn push(&mut self, kind: GroupKind, start: usize, end: usize) {
        self.found.push(Group {
            kind,
            start,
            end,
            level: self.open.len(),
            ordinal: 0,
            text: self.rhs[start..end].to_owned(),
        });
    }

    fn close(&mut self, kind: GroupKind, at: usize, end: usize) -> Result<()> {
        match self.open.pop() {
            Some((k, start)) if k == kind => {
                self.push(kind, start, end);
                Ok(())
            }
            _ => Err(Error::Unbalanced(at)),
        }
    }

    fn scan(mut self) -> Result<Vec<Group>> {
        let rhs = self.rhs;
        let mut at = 0;
        while let Some(c) = rhs[at..].chars().next() {
            let rest = &rhs[at..];

            if c == '"' || c == '\'' {
                let (rem, _) = terminal(rest).map_err(|_| Error::UnterminatedTerminal(at))?;
                let end = rhs.len() - rem.len();
                self.push(GroupKind::Terminal, at, end);
                at = end;
                continue;
            }

            if rest.starts_with("%%") {
                let closes = matches!(self.open.last(), Some((GroupKind::Repeating, _)));
                if closes {
                    self.close(GroupKind::Repeating, at, at + 2)?;
                } else {
                    self.open.push((GroupKind::Repeating, at));
                }
                at += 2;
                continue;
            }

            if let Some(kind) = opening(c) {
                self.open.push((kind, at));
            } else if let Some(kind) = closing(c) {
                self.close(kind, at, at + 1)?;
            }
            at += c.len_utf8();
        }

        if let Some(&(_, start)) = self.open.last() {
            return Err(Error::Unbalanced(start));
        }

        self.found.sort_by_key(|g| g.start);
        for (ordinal, group) in self.found.iter_mut().enumerate() {
            group.ordinal = ordinal;
        }
        Ok(self.found)
    }
}

/// Enumerate every group and terminal in `rhs`, ordered by start.
///
/// Brackets inside terminals are ignored. A `%%` closes the innermost group
/// if that group was opened by `%%`, and opens a new one otherwise.
pub fn groups(rhs: &str) -> Result<Vec<Group>> {
    Scanner {
        rhs,
        found: Vec::new(),
        open: Vec::new(),
    }
    .scan()
}

/// Which groups contain which, by position in the text rather than by
/// bracket nesting. Finished groups are dropped from both directions.
#[derive(Debug, Clone)]
pub struct Containment {
    contains: Vec<BTreeSet<usize>>,
    contained_by: Vec<BTreeSet<usize>>,
    finished: Vec<bool>,
}

impl Containment {
    pub fn new(groups: &[Group]) -> Self {
        let n = groups.len();
        let mut contains = vec![BTreeSet::new(); n];
        let mut contained_by = vec![BTreeSet::new(); n];
        for (i, outer) in groups.iter().enumerate() {
            for (j, inner) in groups.iter().enumerate() {
                if i != j && outer.contains(inner) {
                    contains[i].insert(j);
                    contained_by[j].insert(i);
                }
            }
        }
        Containment {
            contains,
            contained_by,
            finished: vec![false; n],
        }
    }

    /// Unfinished groups that contain no unfinished group, in order.
    pub fn leaves(&self) -> Vec<usize> {
        (0..self.finished.len())
            .filter(|&i| !self.finished[i] && self.contains[i].is_empty())
            .collect()
    }

    pub fn contains(&self, group: usize) -> &BTreeSet<usize> {
        &self.contains[group]
    }

    pub fn contained_by(&self, group: usize) -> &BTreeSet<usize> {
        &self.contained_by[group]
    }

    pub fn finish(&mut self, group: usize) {
        self.finished[group] = true;
        for set in self.contains.iter_mut().chain(self.contained_by.iter_mut()) {
            set.remove(&group);
        }
    }

    pub fn is_finished(&self, group: usize) -> bool {
        self.finished[group]
    }

    pub fn is_done(&self) -> bool {
        self.finished.iter().all(|&f| f)
    }
}
