use crate::rule::RuleId;

/// Describes the location of a span relative to another span.
#[derive(Debug, PartialEq)]
pub enum RelativeLocation {
    Before,
    After,
    /// The span is completely contained inside the other span, or both spans
    /// cover the same region.
    Within,
    /// The span completely encompasses the other span.
    Encompasses,
    /// The spans partially overlap.
    Overlaps,
}

/// A match of one rule over a region of the input, together with every
/// match nested inside that region.
///
/// Positions are counted in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub length: usize,
    pub rule: RuleId,
    /// Priority class of `rule`, kept here so spans can be ordered without
    /// the rule table.
    pub ordinal: u8,
    pub text: String,
    pub inner_spans: Vec<Span>,
}

impl Span {
    pub fn new(start: usize, rule: RuleId, ordinal: u8, text: String) -> Self {
        Span {
            start,
            length: text.chars().count(),
            rule,
            ordinal,
            text,
            inner_spans: Vec::new(),
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Check if this span contains the entirety of the other span.
    pub fn contains(&self, other: &Span) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }

    /// Check if `index` falls inside this span.
    pub fn covers(&self, index: usize) -> bool {
        self.start <= index && index < self.end()
    }

    /// Describes this span's location relative to `other`.
    pub fn relative_location(&self, other: &Span) -> RelativeLocation {
        if self.end() <= other.start {
            RelativeLocation::Before
        } else if self.start >= other.end() {
            RelativeLocation::After
        } else if other.contains(self) {
            RelativeLocation::Within
        } else if self.contains(other) {
            RelativeLocation::Encompasses
        } else {
            RelativeLocation::Overlaps
        }
    }

    /// Pre-order walk over this span and everything nested inside it.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a Span>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Span;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.stack.pop()?;
        self.stack.extend(span.inner_spans.iter().rev());
        Some(span)
    }
}

/// Largest end position over a forest of spans. Zero for an empty forest.
pub fn forest_end(spans: &[Span]) -> usize {
    spans
        .iter()
        .flat_map(Span::walk)
        .map(Span::end)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, text: &str) -> Span {
        Span::new(start, RuleId(0), 1, text.to_owned())
    }

    #[test]
    fn span_relative_location() {
        // "hello world"
        let a = span(0, "hello");
        let b = span(5, " world");
        let c = span(0, "hello world");
        let d = span(3, "lo w");

        assert_eq!(RelativeLocation::Before, a.relative_location(&b));
        assert_eq!(RelativeLocation::After, b.relative_location(&a));
        assert_eq!(RelativeLocation::Within, a.relative_location(&c));
        assert_eq!(RelativeLocation::Within, b.relative_location(&c));
        assert_eq!(RelativeLocation::Within, c.relative_location(&c));
        assert_eq!(RelativeLocation::Encompasses, c.relative_location(&a));
        assert_eq!(RelativeLocation::Encompasses, c.relative_location(&b));
        assert_eq!(RelativeLocation::Overlaps, a.relative_location(&d));
    }

    #[test]
    fn length_counts_chars() {
        let s = span(2, "héllo");
        assert_eq!(s.length, 5);
        assert_eq!(s.end(), 7);
        assert!(s.covers(2));
        assert!(s.covers(6));
        assert!(!s.covers(7));
    }

    #[test]
    fn walk_is_pre_order() {
        let mut outer = span(0, "abc");
        let mut mid = span(0, "ab");
        mid.inner_spans = vec![span(0, "a"), span(1, "b")];
        outer.inner_spans = vec![mid, span(2, "c")];

        let texts: Vec<&str> = outer.walk().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "ab", "a", "b", "c"]);
        assert_eq!(forest_end(&[outer]), 3);
        assert_eq!(forest_end(&[]), 0);
    }
}
