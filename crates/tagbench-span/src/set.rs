//! Normalized span sets
//!
//! Provides [`SpanSet`], the sorted and merged span list owned by an extent tag.

use crate::codec::{self, SpanFormatError};
use crate::span::{Anchor, Span};
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Sorted, non-overlapping, non-adjacent set of spans
///
/// Discontiguous mentions own more than one span; most tags own exactly one,
/// so the first two spans are stored inline.
///
/// # Invariants
/// - spans are sorted ascending by start
/// - no two spans overlap or touch
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpanSet(SmallVec<[Span; 2]>);

impl SpanSet {
    /// Empty set (non-consuming tags)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Set holding one span
    #[inline]
    #[must_use]
    pub fn single(span: Span) -> Self {
        let mut inner = SmallVec::new();
        inner.push(span);
        Self(inner)
    }

    /// Merge overlapping and adjacent spans, sorted ascending
    #[must_use]
    pub fn union(spans: impl IntoIterator<Item = Span>) -> Self {
        let mut sorted: SmallVec<[Span; 2]> = spans.into_iter().collect();
        sorted.sort_unstable();

        let mut merged: SmallVec<[Span; 2]> = SmallVec::with_capacity(sorted.len());
        for span in sorted {
            match merged.last_mut() {
                Some(last) if last.touches(&span) => {
                    if span.end() > last.end() {
                        *last = Span::new(last.start(), span.end()).unwrap_or(*last);
                    }
                }
                _ => merged.push(span),
            }
        }
        Self(merged)
    }

    /// Build from spans that must not overlap
    ///
    /// Input order is irrelevant; adjacent spans are merged. Returns `None`
    /// if any two spans share a character.
    #[must_use]
    pub fn try_disjoint(spans: &[Span]) -> Option<Self> {
        let mut sorted: SmallVec<[Span; 2]> = spans.iter().copied().collect();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0].intersects(&w[1])) {
            return None;
        }
        Some(Self::union(sorted))
    }

    /// Spans in ascending order
    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.0
    }

    /// Number of disjoint spans
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set covers nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate spans ascending
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.0.iter()
    }

    /// Lowest covered offset
    #[inline]
    #[must_use]
    pub fn start(&self) -> Option<usize> {
        self.0.first().map(Span::start)
    }

    /// Exclusive upper bound of the last span
    #[inline]
    #[must_use]
    pub fn end(&self) -> Option<usize> {
        self.0.last().map(Span::end)
    }

    /// Total number of covered characters
    #[must_use]
    pub fn covered_len(&self) -> usize {
        self.0.iter().map(Span::len).sum()
    }

    /// Check if offset is covered by any span
    #[must_use]
    pub fn contains(&self, point: Anchor) -> bool {
        // sorted, so binary search on start
        let idx = self.0.partition_point(|s| s.start() <= point);
        idx > 0 && self.0[idx - 1].contains(point)
    }

    /// Check if any span intersects `span`
    #[must_use]
    pub fn intersects(&self, span: &Span) -> bool {
        self.0.iter().any(|s| s.intersects(span))
    }

    /// Check if any span intersects any of `ranges`
    #[must_use]
    pub fn intersects_any(&self, ranges: &[Span]) -> bool {
        ranges.iter().any(|r| self.intersects(r))
    }

    /// Every covered anchor, ascending
    pub fn anchors(&self) -> impl Iterator<Item = Anchor> + '_ {
        self.0.iter().flat_map(Span::anchors)
    }
}

/// Merge overlapping and adjacent ranges, sorted ascending
#[inline]
#[must_use]
pub fn union(spans: &[Span]) -> SpanSet {
    SpanSet::union(spans.iter().copied())
}

/// Check that no two spans in a raw list share a character
///
/// Adjacent spans are fine; they merge on normalization.
#[must_use]
pub fn validate_disjoint(spans: &[Span]) -> bool {
    SpanSet::try_disjoint(spans).is_some()
}

/// Check if offset is covered by any span in the set
#[inline]
#[must_use]
pub fn contains(spans: &SpanSet, point: Anchor) -> bool {
    spans.contains(point)
}

impl Display for SpanSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::serialize(self))
    }
}

impl FromStr for SpanSet {
    type Err = SpanFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::parse(s)
    }
}

/// Stored records must already be disjoint; overlap is an error, not a merge
impl TryFrom<String> for SpanSet {
    type Error = SpanFormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        codec::parse_disjoint(&s)
    }
}

impl From<SpanSet> for String {
    fn from(set: SpanSet) -> Self {
        codec::serialize(&set)
    }
}

impl From<Span> for SpanSet {
    fn from(span: Span) -> Self {
        Self::single(span)
    }
}

impl FromIterator<Span> for SpanSet {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        Self::union(iter)
    }
}

impl<'a> IntoIterator for &'a SpanSet {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
