//! Text extraction over character offsets

use crate::set::SpanSet;

/// Joins the text of discontiguous spans
pub const DISCONTIGUOUS_SEPARATOR: &str = " ... ";

/// Span reaches past the end of the document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("span end {end} exceeds document length {len}")]
pub struct OutOfBounds {
    /// Offending exclusive end offset
    pub end: usize,
    /// Document length in characters
    pub len: usize,
}

/// Document length in characters (the unit of every offset)
#[inline]
#[must_use]
pub fn char_len(document: &str) -> usize {
    document.chars().count()
}

/// Text covered by `spans`, in span order
///
/// Discontiguous spans are joined with [`DISCONTIGUOUS_SEPARATOR`]. The empty
/// set yields the empty string.
///
/// # Errors
/// Returns [`OutOfBounds`] if any span ends past the document
pub fn text_for(spans: &SpanSet, document: &str) -> Result<String, OutOfBounds> {
    if let Some(end) = spans.end() {
        let len = char_len(document);
        if end > len {
            return Err(OutOfBounds { end, len });
        }
    }

    let parts: Vec<&str> = spans
        .iter()
        .map(|span| {
            let from = byte_offset(document, span.start());
            let to = byte_offset(document, span.end());
            &document[from..to]
        })
        .collect();

    Ok(parts.join(DISCONTIGUOUS_SEPARATOR))
}

// caller has bounds-checked `char_offset`
fn byte_offset(document: &str, char_offset: usize) -> usize {
    document
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(document.len()))
        .nth(char_offset)
        .unwrap_or(document.len())
}
