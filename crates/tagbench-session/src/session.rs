//! Session manager
//!
//! Owns one schema and one tag store per open document. Moves between two
//! states: no schema, and schema loaded with zero or more open documents.
//! All per-session mutable state lives in one session context created on
//! schema load and dropped on reload.

use crate::adjudication::Adjudication;
use crate::config::SessionConfig;
use crate::document::DocumentSource;
use crate::error::{Result, SessionError};
use crate::mode::AnnotationMode;
use crate::outcome::{EditOutcome, SwitchOutcome};
use crate::repaint::{anchors_of_type, RepaintTracker};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tagbench_schema::{load_schema, SchemaModel, SchemaSource, TagType};
use tagbench_span::{parse_spans, Anchor, Span};
use tagbench_store::{
    MemoryDriver, PersistenceDriver, StoreError, Tag, TagDraft, TagId, TagStore,
};
use tracing::{debug, info, warn};

/// One field edit on one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagField {
    /// Serialized span set (`start~end,...`)
    Spans(String),
    /// Text of a tag without spans
    Text(String),
    /// Bind (`Some`) or clear (`None`) an argument slot
    Argument {
        /// Slot name
        name: String,
        /// Extent tag to bind
        target: Option<TagId>,
    },
    /// Set an attribute; empty unsets
    Attribute {
        /// Attribute name
        name: String,
        /// New value
        value: String,
    },
}

/// A document open in the session
#[derive(Debug)]
pub struct OpenDocument {
    path: PathBuf,
    store: TagStore,
    activated: BTreeSet<String>,
}

impl OpenDocument {
    /// Absolute path the document was opened from
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base file name
    #[must_use]
    pub fn name(&self) -> String {
        self.store.document().name()
    }

    /// Tag store (read-only; mutate through the session)
    #[inline]
    #[must_use]
    pub fn store(&self) -> &TagStore {
        &self.store
    }

    /// Tag type names activated for display
    #[inline]
    #[must_use]
    pub fn activated_types(&self) -> &BTreeSet<String> {
        &self.activated
    }

    /// Check if a tag type is activated for display
    #[inline]
    #[must_use]
    pub fn is_type_activated(&self, name: &str) -> bool {
        self.activated.contains(name)
    }

    pub(crate) fn store_mut(&mut self) -> &mut TagStore {
        &mut self.store
    }

    /// Anchors `id` highlights, if its type is displayed
    pub(crate) fn visible_anchors(&self, id: &TagId) -> BTreeSet<Anchor> {
        match self.store.get_tag_by_tid(id) {
            Some(tag) if self.is_type_activated(tag.tag_type().name()) => {
                self.store.get_anchors_by_tid(id)
            }
            _ => BTreeSet::new(),
        }
    }

    /// Visible anchors of `id` and of every link referencing it
    fn highlight_of(&self, id: &TagId) -> BTreeSet<Anchor> {
        let mut anchors = self.visible_anchors(id);
        for link in self.referencing_ids(id) {
            anchors.extend(self.visible_anchors(&link));
        }
        anchors
    }

    fn referencing_ids(&self, id: &TagId) -> Vec<TagId> {
        self.store
            .links_referencing(id)
            .into_iter()
            .map(|l| l.id().clone())
            .collect()
    }

    fn tags(&self, ids: &[TagId]) -> Vec<Tag> {
        ids.iter()
            .filter_map(|id| self.store.get_tag_by_tid(id).cloned())
            .collect()
    }
}

/// Session-wide mutable state, valid for one loaded schema
#[derive(Debug)]
pub(crate) struct SessionContext {
    pub(crate) schema: Arc<SchemaModel>,
    pub(crate) source: Arc<dyn SchemaSource>,
    pub(crate) documents: Vec<OpenDocument>,
    pub(crate) current: Option<usize>,
    pub(crate) tracker: RepaintTracker,
    pub(crate) adjudication: Option<Adjudication>,
    pub(crate) mode: AnnotationMode,
}

impl SessionContext {
    fn fresh(schema: Arc<SchemaModel>, source: Arc<dyn SchemaSource>) -> Self {
        Self {
            schema,
            source,
            documents: Vec::new(),
            current: None,
            tracker: RepaintTracker::new(),
            adjudication: None,
            mode: AnnotationMode::Normal,
        }
    }

    fn destroy_all(&mut self) {
        for mut doc in self.documents.drain(..) {
            if let Err(e) = doc.store.destroy() {
                warn!(document = %doc.path.display(), error = %e, "Failed to destroy tag store");
            }
        }
        self.current = None;
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index < self.documents.len() {
            Ok(())
        } else {
            Err(SessionError::IndexOutOfRange {
                index,
                len: self.documents.len(),
            })
        }
    }

    pub(crate) fn switch_to(&mut self, index: usize) -> Result<SwitchOutcome> {
        self.check_index(index)?;
        let doc = &self.documents[index];
        let repaint = self.tracker.switch(&doc.store, &doc.activated);
        self.current = Some(index);
        info!(index, document = %doc.name(), repaint = repaint.len(), "Switched document");
        Ok(SwitchOutcome { index, repaint })
    }

    /// Current document index, if it accepts mutations
    fn writable_current(&self) -> Result<usize> {
        let index = self.current.ok_or(SessionError::NoDocument)?;
        if let Some(adj) = &self.adjudication {
            if adj.target != index {
                return Err(SessionError::ReadOnlyDocument(self.documents[index].name()));
            }
        }
        Ok(index)
    }

    fn creatable_type(&self, name: &str) -> Result<Arc<TagType>> {
        let tag_type = self
            .schema
            .type_by_name(name)
            .ok_or_else(|| SessionError::UnknownTagType(name.to_string()))?;
        if let Some(adj) = &self.adjudication {
            if adj.tag_type.name() != name {
                return Err(SessionError::TypeUnavailable(name.to_string()));
            }
        }
        Ok(tag_type)
    }
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    NoSchema,
    SchemaLoaded(SessionContext),
}

/// Entry point for every annotation intent
#[derive(Debug, Default)]
pub struct SessionManager {
    config: SessionConfig,
    state: SessionState,
}

impl SessionManager {
    /// Create session without a schema
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::NoSchema,
        }
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn ctx(&self) -> Result<&SessionContext> {
        match &self.state {
            SessionState::SchemaLoaded(ctx) => Ok(ctx),
            SessionState::NoSchema => Err(SessionError::NoSchema),
        }
    }

    pub(crate) fn ctx_mut(&mut self) -> Result<&mut SessionContext> {
        match &mut self.state {
            SessionState::SchemaLoaded(ctx) => Ok(ctx),
            SessionState::NoSchema => Err(SessionError::NoSchema),
        }
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    /// Load a schema, closing every open document
    ///
    /// On failure the session keeps its prior schema and documents.
    ///
    /// # Errors
    /// [`SessionError::Schema`] if the source cannot be loaded
    pub fn load_schema(&mut self, source: Arc<dyn SchemaSource>) -> Result<Arc<SchemaModel>> {
        let schema = Arc::new(load_schema(source.as_ref())?);
        if let SessionState::SchemaLoaded(ctx) = &mut self.state {
            ctx.destroy_all();
        }
        self.state = SessionState::SchemaLoaded(SessionContext::fresh(Arc::clone(&schema), source));
        info!(task = schema.name(), types = schema.len(), "Schema loaded into session");
        Ok(schema)
    }

    /// Check if a schema is loaded
    #[inline]
    #[must_use]
    pub fn is_schema_loaded(&self) -> bool {
        matches!(self.state, SessionState::SchemaLoaded(_))
    }

    /// Loaded schema
    #[must_use]
    pub fn schema(&self) -> Option<&Arc<SchemaModel>> {
        self.ctx().ok().map(|ctx| &ctx.schema)
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Open a document with an in-memory driver and make it current
    ///
    /// # Errors
    /// See [`open_document_with_driver`](Self::open_document_with_driver)
    pub fn open_document(&mut self, source: &dyn DocumentSource) -> Result<SwitchOutcome> {
        self.open_document_with_driver(source, Box::new(MemoryDriver::new()))
    }

    /// Open a document over the given driver and make it current
    ///
    /// # Errors
    /// - [`SessionError::NoSchema`] before any schema is loaded
    /// - [`SessionError::DuplicatePath`] if the same absolute path is open
    /// - [`SessionError::Document`] if the source cannot be read
    /// - [`SessionError::Store`] if its records do not fit the schema
    pub fn open_document_with_driver(
        &mut self,
        source: &dyn DocumentSource,
        driver: Box<dyn PersistenceDriver>,
    ) -> Result<SwitchOutcome> {
        let activate_all = self.config.activate_all_on_open;
        let ctx = self.ctx_mut()?;

        let path = absolute_path(source.path());
        if ctx.documents.iter().any(|d| d.path == path) {
            warn!(path = %path.display(), "Document already open");
            return Err(SessionError::DuplicatePath(path));
        }

        let loaded = source.load()?;
        let mut store = TagStore::with_driver(Arc::clone(&ctx.schema), loaded.document, driver);
        store.seed(&loaded.records)?;

        let activated = if activate_all {
            ctx.schema
                .all_types()
                .iter()
                .map(|t| t.name().to_string())
                .collect()
        } else {
            BTreeSet::new()
        };

        info!(path = %path.display(), tags = store.len(), "Opened document");
        ctx.documents.push(OpenDocument {
            path,
            store,
            activated,
        });
        let index = ctx.documents.len() - 1;
        ctx.switch_to(index)
    }

    /// Close the document at `index`
    ///
    /// Closing the last document reloads the schema fresh instead, leaving a
    /// session with a schema and no documents. Returns the switch outcome if
    /// the current document changed to another open one.
    ///
    /// # Errors
    /// - [`SessionError::NoSchema`] before any schema is loaded
    /// - [`SessionError::IndexOutOfRange`] for a bad index
    pub fn close_document(&mut self, index: usize) -> Result<Option<SwitchOutcome>> {
        let ctx = self.ctx_mut()?;
        ctx.check_index(index)?;

        if ctx.documents.len() == 1 {
            let source = Arc::clone(&ctx.source);
            let schema = match load_schema(source.as_ref()) {
                Ok(schema) => Arc::new(schema),
                Err(e) => {
                    warn!(error = %e, "Schema reload failed, keeping the loaded schema");
                    Arc::clone(&ctx.schema)
                }
            };
            ctx.destroy_all();
            *ctx = SessionContext::fresh(schema, source);
            info!("Closed last document, schema reloaded");
            return Ok(None);
        }

        let mut doc = ctx.documents.remove(index);
        if let Err(e) = doc.store.destroy() {
            warn!(document = %doc.path.display(), error = %e, "Failed to destroy tag store");
        }
        info!(index, document = %doc.name(), "Closed document");

        let mut ended = false;
        if let Some(adj) = &mut ctx.adjudication {
            if adj.target == index {
                ended = true;
            } else if adj.target > index {
                adj.target -= 1;
            }
        }
        if ended {
            ctx.adjudication = None;
            info!("Adjudication target closed, adjudication ended");
        }

        match ctx.current {
            Some(cur) if cur == index => {
                let next = index.min(ctx.documents.len() - 1);
                ctx.switch_to(next).map(Some)
            }
            Some(cur) if cur > index => {
                ctx.current = Some(cur - 1);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Make the document at `index` current
    ///
    /// # Errors
    /// - [`SessionError::NoSchema`] before any schema is loaded
    /// - [`SessionError::IndexOutOfRange`] for a bad index
    pub fn switch_to(&mut self, index: usize) -> Result<SwitchOutcome> {
        self.ctx_mut()?.switch_to(index)
    }

    /// Open documents in open order
    #[must_use]
    pub fn documents(&self) -> &[OpenDocument] {
        match self.ctx() {
            Ok(ctx) => &ctx.documents,
            Err(_) => &[],
        }
    }

    /// Document at `index`
    #[must_use]
    pub fn document(&self, index: usize) -> Option<&OpenDocument> {
        self.documents().get(index)
    }

    /// Index of the current document
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.ctx().ok().and_then(|ctx| ctx.current)
    }

    /// Current document
    #[must_use]
    pub fn current_document(&self) -> Option<&OpenDocument> {
        self.document(self.current_index()?)
    }

    /// Show or hide one tag type on the document at `index`
    ///
    /// Returns the anchors to repaint: the type's anchors when its state
    /// flipped on the current document, nothing otherwise. Toggles on the
    /// current document move the repaint baseline with them.
    ///
    /// # Errors
    /// - [`SessionError::UnknownTagType`] if the schema lacks the type
    /// - [`SessionError::IndexOutOfRange`] for a bad index
    pub fn set_type_activated(
        &mut self,
        index: usize,
        tag_type: &str,
        activated: bool,
    ) -> Result<BTreeSet<Anchor>> {
        let ctx = self.ctx_mut()?;
        if ctx.schema.type_by_name(tag_type).is_none() {
            return Err(SessionError::UnknownTagType(tag_type.to_string()));
        }
        ctx.check_index(index)?;

        let doc = &mut ctx.documents[index];
        let flipped = if activated {
            doc.activated.insert(tag_type.to_string())
        } else {
            doc.activated.remove(tag_type)
        };
        if ctx.current != Some(index) {
            return Ok(BTreeSet::new());
        }
        ctx.tracker.record_toggle(tag_type, activated);
        if !flipped {
            return Ok(BTreeSet::new());
        }
        debug!(tag_type, activated, "Toggled tag type display");
        Ok(anchors_of_type(&doc.store, tag_type))
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    /// Current annotation mode
    #[must_use]
    pub fn mode(&self) -> AnnotationMode {
        self.ctx().map_or(AnnotationMode::Normal, |ctx| ctx.mode)
    }

    /// Change annotation mode
    ///
    /// # Errors
    /// [`SessionError::NoSchema`] before any schema is loaded
    pub fn set_mode(&mut self, mode: AnnotationMode) -> Result<()> {
        let ctx = self.ctx_mut()?;
        if ctx.mode != mode {
            debug!(from = %ctx.mode, to = %mode, "Changed annotation mode");
            ctx.mode = mode;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tag intents
    // ------------------------------------------------------------------

    /// Create a tag in the current document with its default attributes
    ///
    /// `spans` is ignored for link types; an empty list creates a
    /// non-consuming extent tag.
    ///
    /// # Errors
    /// - [`SessionError::NoDocument`] without a current document
    /// - [`SessionError::ReadOnlyDocument`] on an adjudication source
    /// - [`SessionError::UnknownTagType`] / [`SessionError::TypeUnavailable`]
    /// - [`SessionError::Store`] if the store rejects the tag
    pub fn create_tag(&mut self, tag_type: &str, spans: &[Span]) -> Result<EditOutcome> {
        let reset_mode = self.config.normal_mode_on_creation;
        let ctx = self.ctx_mut()?;
        let index = ctx.writable_current()?;
        let tag_type = ctx.creatable_type(tag_type)?;

        let doc = &mut ctx.documents[index];
        let mut draft = TagDraft::new().with_defaults();
        if tag_type.is_extent() {
            draft = draft.with_spans(spans);
        }
        let id = doc.store.next_id(&tag_type);
        doc.store.create_tag(id.clone(), &tag_type, draft)?;

        if reset_mode {
            ctx.mode = AnnotationMode::Normal;
        }
        info!(id = %id, tag_type = %tag_type, "Created tag");
        Ok(EditOutcome {
            updated: doc.tags(std::slice::from_ref(&id)),
            deleted: Vec::new(),
            repaint: doc.visible_anchors(&id),
        })
    }

    /// Create a link tag binding `targets` to its slots in declaration order
    ///
    /// Targets beyond the declared slots are ignored.
    ///
    /// # Errors
    /// As [`create_tag`](Self::create_tag); additionally
    /// [`SessionError::Store`] with `NotFound` if a target is not live, or
    /// `SchemaViolation` if the type is not a link type or a target is a link
    pub fn create_link_with_arguments(
        &mut self,
        tag_type: &str,
        targets: &[TagId],
    ) -> Result<EditOutcome> {
        let reset_mode = self.config.normal_mode_on_creation;
        let ctx = self.ctx_mut()?;
        let index = ctx.writable_current()?;
        let tag_type = ctx.creatable_type(tag_type)?;
        let doc = &mut ctx.documents[index];

        for target in targets {
            match doc.store.get_tag_by_tid(target) {
                None => return Err(StoreError::NotFound(target.clone()).into()),
                Some(Tag::Link(_)) => {
                    return Err(StoreError::SchemaViolation(format!(
                        "argument target {target} is a link tag"
                    ))
                    .into())
                }
                Some(Tag::Extent(_)) => {}
            }
        }
        if targets.len() > tag_type.arguments().len() {
            warn!(tag_type = %tag_type, given = targets.len(), "Extra argument targets ignored");
        }

        if !tag_type.is_link() {
            return Err(
                StoreError::SchemaViolation(format!("'{tag_type}' is not a link type")).into(),
            );
        }
        let draft = tag_type
            .arguments()
            .iter()
            .zip(targets)
            .fold(TagDraft::new().with_defaults(), |draft, (slot, target)| {
                draft.with_argument(slot.name(), target.clone())
            });
        let id = doc.store.next_id(&tag_type);
        doc.store.create_tag(id.clone(), &tag_type, draft)?;

        if reset_mode {
            ctx.mode = AnnotationMode::Normal;
        }
        info!(id = %id, tag_type = %tag_type, arguments = targets.len(), "Created link");
        Ok(EditOutcome {
            updated: doc.tags(std::slice::from_ref(&id)),
            deleted: Vec::new(),
            repaint: doc.visible_anchors(&id),
        })
    }

    /// Delete a tag from the current document, cascading to its links
    ///
    /// # Errors
    /// - [`SessionError::NoDocument`] / [`SessionError::ReadOnlyDocument`]
    /// - [`SessionError::Store`] if the tag is unknown or the driver fails
    pub fn delete_tag(&mut self, id: &TagId) -> Result<EditOutcome> {
        let ctx = self.ctx_mut()?;
        let index = ctx.writable_current()?;
        let doc = &mut ctx.documents[index];

        let repaint = doc.highlight_of(id);
        let deleted = doc.store.delete_tag(id)?;
        info!(id = %id, cascaded = deleted.len().saturating_sub(1), "Deleted tag");
        Ok(EditOutcome {
            updated: Vec::new(),
            deleted,
            repaint,
        })
    }

    /// Apply one field edit to a tag in the current document
    ///
    /// # Errors
    /// - [`SessionError::NoDocument`] / [`SessionError::ReadOnlyDocument`]
    /// - [`SessionError::SpanFormat`] for malformed serialized spans
    /// - [`SessionError::Store`] with `TypeMismatch` if the tag's type does
    ///   not declare the named attribute or argument, `NotFound` for unknown
    ///   tags, or a driver failure
    pub fn update_field(&mut self, id: &TagId, field: TagField) -> Result<EditOutcome> {
        let ctx = self.ctx_mut()?;
        let index = ctx.writable_current()?;
        let doc = &mut ctx.documents[index];

        let tag_type = doc
            .store
            .get_tag_by_tid(id)
            .map(|t| Arc::clone(t.tag_type()))
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let mismatch = |name: &str| StoreError::TypeMismatch {
            tag_type: tag_type.name().to_string(),
            name: name.to_string(),
        };

        let moves_highlight = matches!(field, TagField::Spans(_) | TagField::Argument { .. });
        let before = if moves_highlight {
            doc.highlight_of(id)
        } else {
            BTreeSet::new()
        };

        let applied = match &field {
            TagField::Spans(raw) => {
                let spans = parse_spans(raw)?;
                doc.store.update_tag_spans(id, &spans)?
            }
            TagField::Text(text) => doc.store.update_tag_text(id, text)?,
            TagField::Argument { name, target } => {
                let slot = tag_type.argument(name).ok_or_else(|| mismatch(name))?;
                let bound = match target {
                    Some(target) => doc.store.add_or_update_argument(id, slot, target)?,
                    None => doc.store.clear_argument(id, slot)?,
                };
                bound.is_some()
            }
            TagField::Attribute { name, value } => {
                let att = tag_type.attribute(name).ok_or_else(|| mismatch(name))?;
                doc.store.add_attribute(id, att, value)?.is_some()
            }
        };
        if !applied {
            debug!(id = %id, ?field, "Edit declined by store");
            return Ok(EditOutcome::default());
        }

        let mut repaint = before;
        if moves_highlight {
            repaint.extend(doc.highlight_of(id));
        }
        // Link text follows its arguments' text
        let mut ids = vec![id.clone()];
        if matches!(field, TagField::Spans(_) | TagField::Text(_)) {
            ids.extend(doc.referencing_ids(id));
        }
        debug!(id = %id, ?field, "Updated tag field");
        Ok(EditOutcome {
            updated: doc.tags(&ids),
            deleted: Vec::new(),
            repaint,
        })
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Names of documents with unsaved changes, in open order
    #[must_use]
    pub fn unsaved_documents(&self) -> Vec<String> {
        self.documents()
            .iter()
            .filter(|d| d.store.is_annotation_changed())
            .map(OpenDocument::name)
            .collect()
    }

    /// Check if any open document has unsaved changes
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.documents()
            .iter()
            .any(|d| d.store.is_annotation_changed())
    }

    /// Write the current document's snapshot as JSON and mark it saved
    ///
    /// # Errors
    /// - [`SessionError::NoDocument`] without a current document
    /// - [`SessionError::Io`] / [`SessionError::Json`] if writing fails
    pub fn save_current(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let index = self.current_index().ok_or(SessionError::NoDocument)?;
        self.save_document(index, path)
    }

    /// Write one document's snapshot as JSON and mark it saved
    ///
    /// # Errors
    /// - [`SessionError::IndexOutOfRange`] for a bad index
    /// - [`SessionError::Io`] / [`SessionError::Json`] if writing fails
    pub fn save_document(&mut self, index: usize, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let ctx = self.ctx_mut()?;
        ctx.check_index(index)?;
        let doc = &mut ctx.documents[index];

        let json = doc.store.export()?.to_json_string()?;
        std::fs::write(&path, json).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        doc.store.mark_saved();
        info!(document = %doc.name(), path = %path.display(), "Saved document");
        Ok(path)
    }

    /// Save path next to the document: stem, configured suffix, `.json`
    ///
    /// # Errors
    /// [`SessionError::IndexOutOfRange`] for a bad index
    pub fn suggested_save_path(&self, index: usize) -> Result<PathBuf> {
        let doc = self
            .document(index)
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: self.documents().len(),
            })?;
        let stem = doc
            .path
            .file_stem()
            .map_or_else(|| doc.name(), |s| s.to_string_lossy().into_owned());
        let file = format!("{stem}{}.json", self.config.filename_suffix);
        Ok(doc.path.with_file_name(file))
    }
}

/// Absolute form of `path` for duplicate detection
fn absolute_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_of_relative_missing_file() {
        let p = absolute_path(Path::new("no/such/file.txt"));
        assert!(p.is_absolute());
        assert!(p.ends_with("no/such/file.txt"));
    }

    #[test]
    fn fresh_session_has_no_schema() {
        let mut session = SessionManager::default();
        assert!(!session.is_schema_loaded());
        assert!(session.documents().is_empty());
        assert_eq!(session.mode(), AnnotationMode::Normal);
        assert!(matches!(
            session.create_tag("PERSON", &[]),
            Err(SessionError::NoSchema)
        ));
    }
}
