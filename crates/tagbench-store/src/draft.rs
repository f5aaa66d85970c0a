//! Tag drafts
//!
//! A [`TagDraft`] carries everything a new tag starts with, so the store can
//! validate it whole and persist it with a single driver call.

use crate::tag::TagId;
use tagbench_span::Span;

/// Initial contents of a tag about to be created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDraft {
    pub(crate) spans: Vec<Span>,
    pub(crate) text: Option<String>,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) arguments: Vec<(String, TagId)>,
    pub(crate) defaults: bool,
}

impl TagDraft {
    /// Empty draft: no spans, attributes or arguments
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With spans, as given (overlap is rejected at creation)
    #[must_use]
    pub fn with_spans(mut self, spans: &[Span]) -> Self {
        self.spans = spans.to_vec();
        self
    }

    /// With text for a tag that consumes no span
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// With one attribute value; later values for the same name win
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// With one argument slot bound
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, target: TagId) -> Self {
        self.arguments.push((name.into(), target));
        self
    }

    /// Fill attributes left unset with their declared defaults
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.defaults = true;
        self
    }
}
