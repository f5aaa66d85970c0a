//! Text form of span sets
//!
//! Spans serialize as `start~end` pairs joined by `,`, e.g. `0~4,10~15`.
//! The empty set serializes as the empty string.

use crate::set::SpanSet;
use crate::span::Span;

/// Marker older annotation files use for tags that consume no text
pub const LEGACY_EMPTY_MARKER: &str = "-1~-1";

/// Parse serialized spans into a normalized set
///
/// Whitespace around pairs is ignored. Overlapping or unsorted input is
/// accepted and normalized.
///
/// # Errors
/// - [`SpanFormatError::Malformed`] if a pair lacks the `~` separator
/// - [`SpanFormatError::InvalidOffset`] if an offset is not a non-negative integer
/// - [`SpanFormatError::InvalidRange`] if a pair has `start >= end`
pub fn parse(s: &str) -> Result<SpanSet, SpanFormatError> {
    Ok(SpanSet::union(parse_spans(s)?))
}

/// Parse serialized spans as written, without sorting or merging
///
/// Use this when overlap must be detected downstream, e.g. before replacing
/// a tag's spans.
///
/// # Errors
/// Same as [`parse`]
pub fn parse_spans(s: &str) -> Result<Vec<Span>, SpanFormatError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == LEGACY_EMPTY_MARKER {
        return Ok(Vec::new());
    }

    trimmed
        .split(',')
        .map(|pair| {
            let pair = pair.trim();
            let (start, end) = pair
                .split_once('~')
                .ok_or_else(|| SpanFormatError::Malformed(pair.to_string()))?;
            let start = parse_offset(start)?;
            let end = parse_offset(end)?;
            Span::new(start, end)
        })
        .collect()
}

/// Parse serialized spans that must not overlap
///
/// Adjacent spans still merge.
///
/// # Errors
/// [`SpanFormatError::Overlap`] if two pairs share a character, otherwise
/// the same as [`parse`]
pub fn parse_disjoint(s: &str) -> Result<SpanSet, SpanFormatError> {
    let spans = parse_spans(s)?;
    SpanSet::try_disjoint(&spans).ok_or_else(|| SpanFormatError::Overlap(s.trim().to_string()))
}

fn parse_offset(raw: &str) -> Result<usize, SpanFormatError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| SpanFormatError::InvalidOffset(raw.trim().to_string()))
}

/// Serialize a span set into its text form
#[must_use]
pub fn serialize(spans: &SpanSet) -> String {
    spans
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Errors for span construction and parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanFormatError {
    /// Pair without `start~end` shape
    #[error("malformed span pair: '{0}' (expected start~end)")]
    Malformed(String),

    /// Offset not a non-negative integer
    #[error("invalid span offset: '{0}'")]
    InvalidOffset(String),

    /// Empty or inverted range
    #[error("invalid span range: {start}~{end} (start must be below end)")]
    InvalidRange {
        /// Offset the range starts at
        start: usize,
        /// Offset the range ends before
        end: usize,
    },

    /// Pairs sharing a character where a disjoint set is required
    #[error("overlapping spans: '{0}'")]
    Overlap(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end).unwrap()
    }

    #[test]
    fn parse_single_pair() {
        let set = parse("3~7").unwrap();
        assert_eq!(set.spans(), &[span(3, 7)]);
    }

    #[test]
    fn parse_multiple_pairs_normalizes() {
        let set = parse("10~15, 0~4 ,3~5").unwrap();
        assert_eq!(set.spans(), &[span(0, 5), span(10, 15)]);
    }

    #[test]
    fn parse_empty_and_legacy_marker() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  ").unwrap().is_empty());
        assert!(parse(LEGACY_EMPTY_MARKER).unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(matches!(parse("3-7"), Err(SpanFormatError::Malformed(_))));
    }

    #[test]
    fn parse_rejects_bad_offsets() {
        assert!(matches!(parse("a~7"), Err(SpanFormatError::InvalidOffset(_))));
        assert!(matches!(parse("-2~7"), Err(SpanFormatError::InvalidOffset(_))));
        assert!(matches!(parse("0~4,"), Err(SpanFormatError::Malformed(_))));
    }

    #[test]
    fn parse_rejects_inverted() {
        assert!(matches!(
            parse("7~3"),
            Err(SpanFormatError::InvalidRange { start: 7, end: 3 })
        ));
    }

    #[test]
    fn parse_spans_keeps_input_order() {
        let raw = parse_spans("5~8, 0~6").unwrap();
        assert_eq!(raw, vec![span(5, 8), span(0, 6)]);
        assert!(parse_spans(LEGACY_EMPTY_MARKER).unwrap().is_empty());
        assert!(matches!(parse_spans("0~"), Err(SpanFormatError::InvalidOffset(_))));
    }

    #[test]
    fn parse_disjoint_rejects_overlap() {
        assert!(matches!(
            parse_disjoint("0~5,3~8"),
            Err(SpanFormatError::Overlap(raw)) if raw == "0~5,3~8"
        ));
        assert_eq!(parse_disjoint("4~8,0~4").unwrap().spans(), &[span(0, 8)]);
        assert!(parse_disjoint("").unwrap().is_empty());
    }

    #[test]
    fn serialize_joins_pairs() {
        let set = SpanSet::union([span(6, 9), span(0, 4)]);
        assert_eq!(serialize(&set), "0~4,6~9");
        assert_eq!(serialize(&SpanSet::new()), "");
    }

    #[test]
    fn from_str_matches_parse() {
        let set: SpanSet = "0~4,6~9".parse().unwrap();
        assert_eq!(set.to_string(), "0~4,6~9");
    }
}
