//! Repaint-set tracking
//!
//! Each document keeps its own set of tag types activated for display. When
//! the current document changes, only the anchors of types whose activation
//! flipped relative to the last baseline need recoloring.

use std::collections::BTreeSet;
use tagbench_span::Anchor;
use tagbench_store::{Tag, TagStore};
use tracing::debug;

/// Activation baseline recorded at the last switch or reset
///
/// A fresh tracker has an empty baseline, so the first switch repaints every
/// anchor of every activated type.
#[derive(Debug, Clone, Default)]
pub struct RepaintTracker {
    baseline: BTreeSet<String>,
}

impl RepaintTracker {
    /// Create tracker with an empty baseline
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activated type names at the last switch
    #[inline]
    #[must_use]
    pub fn baseline(&self) -> &BTreeSet<String> {
        &self.baseline
    }

    /// Anchors to repaint when `store` becomes current with `activated` types
    ///
    /// Snapshots `activated` as the new baseline.
    pub fn switch(&mut self, store: &TagStore, activated: &BTreeSet<String>) -> BTreeSet<Anchor> {
        let flipped: Vec<&String> = self.baseline.symmetric_difference(activated).collect();
        let mut repaint = BTreeSet::new();
        for name in &flipped {
            repaint.extend(anchors_of_type(store, name));
        }
        debug!(flipped = flipped.len(), anchors = repaint.len(), "Computed repaint set");
        self.baseline.clone_from(activated);
        repaint
    }

    /// Follow an activation toggle on the current document
    pub fn record_toggle(&mut self, tag_type: &str, activated: bool) {
        if activated {
            self.baseline.insert(tag_type.to_string());
        } else {
            self.baseline.remove(tag_type);
        }
    }

    /// Forget the baseline (schema reset)
    pub fn reset(&mut self) {
        self.baseline.clear();
    }
}

/// Anchors highlighted by tags of one type
///
/// Extent types highlight their own spans; link types highlight the spans of
/// their arguments.
#[must_use]
pub fn anchors_of_type(store: &TagStore, name: &str) -> BTreeSet<Anchor> {
    let Some(tag_type) = store.schema().type_by_name(name) else {
        return BTreeSet::new();
    };
    if tag_type.is_extent() {
        return store.get_all_anchors_of_tag_type(&tag_type, &[]);
    }
    store
        .tags_of_type(&tag_type)
        .into_iter()
        .flat_map(|t: &Tag| store.get_anchors_by_tid(t.id()))
        .collect()
}
