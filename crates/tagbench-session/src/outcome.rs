//! Results handed back to the presentation layer

use std::collections::BTreeSet;
use tagbench_span::Anchor;
use tagbench_store::{ExtentTag, Tag, TagId};

/// Effect of one mutating intent
///
/// `updated` is empty when the store declined the edit (overlapping spans, a
/// value outside the value set); the caller may retry with corrected input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditOutcome {
    /// Tags created or changed, state after the edit
    pub updated: Vec<Tag>,
    /// Tags removed, state before removal
    pub deleted: Vec<Tag>,
    /// Anchors whose highlight must be recomputed
    pub repaint: BTreeSet<Anchor>,
}

impl EditOutcome {
    /// Check if the intent changed nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }

    /// First updated tag's id (the created tag after a create intent)
    #[must_use]
    pub fn primary_id(&self) -> Option<&TagId> {
        self.updated.first().map(Tag::id)
    }
}

/// Effect of making a document current
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// Index of the now-current document
    pub index: usize,
    /// Anchors whose highlight must be recomputed
    pub repaint: BTreeSet<Anchor>,
}

/// Extent tag found in one of the open documents
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedTag {
    /// Position in the session's open-document list
    pub document_index: usize,
    /// Document base name
    pub document: String,
    /// Copy of the tag
    pub tag: ExtentTag,
}

/// Result of copying a tag into the adjudication target
#[derive(Debug, Clone, PartialEq)]
pub struct CopiedTag {
    /// New tag, or the equivalent tag already in the target
    pub tag: ExtentTag,
    /// False when an equivalent tag already existed
    pub created: bool,
    /// Anchors whose highlight must be recomputed
    pub repaint: BTreeSet<Anchor>,
}
