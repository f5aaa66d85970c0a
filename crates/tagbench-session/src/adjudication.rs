//! Adjudication
//!
//! One open document is the consolidation target; every other open document
//! becomes a read-only source. Only the adjudicated tag type can be created
//! while the mode is on. Layered on the session manager as a toggle.

use crate::error::{Result, SessionError};
use crate::mode::AnnotationMode;
use crate::outcome::{CopiedTag, SourcedTag, SwitchOutcome};
use crate::session::SessionManager;
use std::collections::BTreeSet;
use std::sync::Arc;
use tagbench_schema::TagType;
use tagbench_span::Span;
use tagbench_store::{StoreError, Tag, TagDraft, TagId};
use tracing::{debug, info};

/// Active adjudication: target document and reconciled type
#[derive(Debug, Clone)]
pub(crate) struct Adjudication {
    pub(crate) target: usize,
    pub(crate) tag_type: Arc<TagType>,
}

impl SessionManager {
    /// Enter adjudication of `tag_type` with the document at `target` as
    /// the consolidation target, which becomes current
    ///
    /// Entering again replaces the previous target and type.
    ///
    /// # Errors
    /// - [`SessionError::NoSchema`] before any schema is loaded
    /// - [`SessionError::UnknownTagType`] if the schema lacks the type
    /// - [`SessionError::IndexOutOfRange`] for a bad index
    pub fn start_adjudication(&mut self, target: usize, tag_type: &str) -> Result<SwitchOutcome> {
        let ctx = self.ctx_mut()?;
        let tag_type = ctx
            .schema
            .type_by_name(tag_type)
            .ok_or_else(|| SessionError::UnknownTagType(tag_type.to_string()))?;
        ctx.check_index(target)?;

        info!(target, tag_type = %tag_type, "Adjudication started");
        ctx.adjudication = Some(Adjudication { target, tag_type });
        ctx.mode = AnnotationMode::Normal;
        ctx.switch_to(target)
    }

    /// Leave adjudication, restoring every tag type
    ///
    /// # Errors
    /// [`SessionError::NotAdjudicating`] if the mode is off
    pub fn end_adjudication(&mut self) -> Result<()> {
        let ctx = self.ctx_mut()?;
        match ctx.adjudication.take() {
            Some(adj) => {
                info!(tag_type = %adj.tag_type, "Adjudication ended");
                Ok(())
            }
            None => Err(SessionError::NotAdjudicating),
        }
    }

    /// Check if adjudication is on
    #[must_use]
    pub fn is_adjudicating(&self) -> bool {
        self.ctx().is_ok_and(|ctx| ctx.adjudication.is_some())
    }

    /// Type being reconciled
    #[must_use]
    pub fn adjudicating_tag_type(&self) -> Option<&Arc<TagType>> {
        self.ctx().ok()?.adjudication.as_ref().map(|a| &a.tag_type)
    }

    /// Index of the consolidation target
    #[must_use]
    pub fn adjudication_target(&self) -> Option<usize> {
        self.ctx().ok()?.adjudication.as_ref().map(|a| a.target)
    }

    /// Tag types the current document accepts new tags of
    ///
    /// All types normally; only the adjudicated type on the target while
    /// adjudicating; nothing on a source document.
    #[must_use]
    pub fn available_tag_types(&self) -> Vec<Arc<TagType>> {
        let Ok(ctx) = self.ctx() else {
            return Vec::new();
        };
        match &ctx.adjudication {
            None => ctx.schema.all_types(),
            Some(adj) if ctx.current == Some(adj.target) => vec![Arc::clone(&adj.tag_type)],
            Some(_) => Vec::new(),
        }
    }

    /// Extent tags intersecting `ranges` across every open document
    ///
    /// Ordered by document index, then tag id.
    #[must_use]
    pub fn extent_tags_from_all_documents(&self, ranges: &[Span]) -> Vec<SourcedTag> {
        self.documents()
            .iter()
            .enumerate()
            .flat_map(|(index, doc)| {
                let name = doc.name();
                doc.store()
                    .get_tags_in(ranges)
                    .into_iter()
                    .map(move |tag| SourcedTag {
                        document_index: index,
                        document: name.clone(),
                        tag: tag.clone(),
                    })
            })
            .collect()
    }

    /// Copy an extent tag from any open document into the target
    ///
    /// The copy keeps type, spans and attributes and gets a fresh id. When
    /// the target already holds a tag of the same type over the same spans,
    /// that tag is returned and nothing changes.
    ///
    /// # Errors
    /// - [`SessionError::NotAdjudicating`] if the mode is off
    /// - [`SessionError::IndexOutOfRange`] for a bad source index
    /// - [`SessionError::TypeUnavailable`] if the tag is not of the
    ///   adjudicated type
    /// - [`SessionError::TypeMismatch`] if the target's schema lacks the type
    /// - [`SessionError::Store`] if the source tag is unknown or a link, or
    ///   the target store rejects the copy
    pub fn copy_tag(&mut self, from_document: usize, id: &TagId) -> Result<CopiedTag> {
        let ctx = self.ctx_mut()?;
        let adj = ctx
            .adjudication
            .as_ref()
            .ok_or(SessionError::NotAdjudicating)?;
        let target = adj.target;
        let adjudicated = Arc::clone(&adj.tag_type);
        ctx.check_index(from_document)?;

        let source = match ctx.documents[from_document].store().get_tag_by_tid(id) {
            Some(Tag::Extent(tag)) => tag.clone(),
            Some(Tag::Link(_)) => {
                return Err(StoreError::SchemaViolation(format!("{id} is a link tag")).into())
            }
            None => return Err(StoreError::NotFound(id.clone()).into()),
        };
        if source.tag_type().name() != adjudicated.name() {
            return Err(SessionError::TypeUnavailable(source.tag_type().name().to_string()));
        }

        let doc = &mut ctx.documents[target];
        let store = doc.store_mut();
        let Some(tag_type) = store
            .schema()
            .type_by_name(source.tag_type().name())
            .filter(|t| t.is_extent())
        else {
            return Err(SessionError::TypeMismatch {
                tag_type: source.tag_type().name().to_string(),
                document: store.document().name(),
            });
        };

        let existing = store
            .tags_of_type(&tag_type)
            .into_iter()
            .filter_map(Tag::as_extent)
            .find(|t| t.is_equivalent(&source))
            .cloned();
        if let Some(tag) = existing {
            debug!(source = %id, existing = %tag.id(), "Equivalent tag already in target");
            return Ok(CopiedTag {
                tag,
                created: false,
                repaint: BTreeSet::new(),
            });
        }

        let mut draft = TagDraft::new()
            .with_spans(source.spans().spans())
            .with_text(source.text())
            .with_defaults();
        for (name, value) in source.attributes() {
            if tag_type.attribute(name).is_some_and(|att| att.allows(value)) {
                draft = draft.with_attribute(name.as_str(), value.as_str());
            }
        }
        let new_id = store.next_id(&tag_type);
        let Tag::Extent(tag) = store.create_tag(new_id.clone(), &tag_type, draft)? else {
            return Err(StoreError::SchemaViolation(format!("{new_id} is a link tag")).into());
        };
        let repaint = doc.visible_anchors(&new_id);
        info!(source = %id, from_document, copy = %new_id, "Copied tag into adjudication target");
        Ok(CopiedTag {
            tag,
            created: true,
            repaint,
        })
    }
}
