//! Single half-open ranges
//!
//! Provides [`Span`], a `[start, end)` range over character offsets.

use crate::codec::SpanFormatError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Character offset into a document, used for highlight lookups
pub type Anchor = usize;

/// Half-open character range `[start, end)`
///
/// Always non-empty: `start < end` holds for every constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create new span
    ///
    /// # Errors
    /// Returns [`SpanFormatError::InvalidRange`] if `start >= end`
    #[inline]
    pub fn new(start: usize, end: usize) -> Result<Self, SpanFormatError> {
        if start >= end {
            return Err(SpanFormatError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Inclusive start offset
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end offset
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of characters covered
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; kept for API symmetry with `len`
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if offset falls inside this span
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Anchor) -> bool {
        self.start <= point && point < self.end
    }

    /// Check if the two spans share at least one character
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if the two spans overlap or touch end-to-start
    #[inline]
    #[must_use]
    pub fn touches(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Every anchor covered by this span, ascending
    #[inline]
    pub fn anchors(&self) -> impl Iterator<Item = Anchor> {
        self.start..self.end
    }
}

/// Check if two spans share at least one character
#[inline]
#[must_use]
pub fn intersects(a: &Span, b: &Span) -> bool {
    a.intersects(b)
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.start, self.end)
    }
}

impl TryFrom<(usize, usize)> for Span {
    type Error = SpanFormatError;

    fn try_from((start, end): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end).unwrap()
    }

    #[test]
    fn span_rejects_empty_and_inverted() {
        assert!(matches!(
            Span::new(4, 4),
            Err(SpanFormatError::InvalidRange { start: 4, end: 4 })
        ));
        assert!(Span::new(5, 2).is_err());
    }

    #[test]
    fn span_contains_is_half_open() {
        let s = span(2, 5);
        assert!(!s.contains(1));
        assert!(s.contains(2));
        assert!(s.contains(4));
        assert!(!s.contains(5));
    }

    #[test]
    fn span_intersects() {
        assert!(intersects(&span(0, 4), &span(3, 6)));
        assert!(!intersects(&span(0, 4), &span(4, 6)));
        assert!(!intersects(&span(7, 9), &span(0, 4)));
    }

    #[test]
    fn span_touches_adjacent() {
        assert!(span(0, 4).touches(&span(4, 6)));
        assert!(!span(0, 4).touches(&span(5, 6)));
    }

    #[test]
    fn span_display() {
        assert_eq!(span(3, 9).to_string(), "3~9");
    }

    #[test]
    fn span_anchors() {
        let anchors: Vec<_> = span(3, 6).anchors().collect();
        assert_eq!(anchors, vec![3, 4, 5]);
    }
}
