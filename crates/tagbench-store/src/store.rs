//! Per-document tag store
//!
//! Provides [`TagStore`], the mutable collection of tags for one open
//! document. Every mutation is confirmed by the persistence driver before the
//! in-memory map changes, so a driver failure leaves both sides untouched.

use crate::document::Document;
use crate::draft::TagDraft;
use crate::driver::{MemoryDriver, PersistenceDriver};
use crate::error::{Result, StoreError};
use crate::export::DocumentSnapshot;
use crate::record::TagRecord;
use crate::tag::{Attribute, ExtentTag, LinkTag, Tag, TagId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tagbench_schema::{ArgumentType, AttributeType, SchemaModel, TagType};
use tagbench_span::{text_for, Anchor, Span, SpanSet};
use tracing::{debug, info, warn};

/// Joins argument texts when describing a link tag
pub const LINK_TEXT_SEPARATOR: &str = " - ";

/// Tags of one document, keyed by id
///
/// # Invariants
/// - every live id is unique and never reissued by [`next_id`](Self::next_id)
/// - link arguments only name live extent tags
/// - the driver holds exactly the records of the live tags
#[derive(Debug)]
pub struct TagStore {
    schema: Arc<SchemaModel>,
    document: Document,
    driver: Box<dyn PersistenceDriver>,
    tags: BTreeMap<TagId, Tag>,
    sequences: HashMap<String, u64>,
    changed: bool,
}

impl TagStore {
    /// Create an empty store backed by a [`MemoryDriver`]
    #[must_use]
    pub fn new(schema: Arc<SchemaModel>, document: Document) -> Self {
        Self::with_driver(schema, document, Box::new(MemoryDriver::new()))
    }

    /// Create an empty store over the given driver
    #[must_use]
    pub fn with_driver(
        schema: Arc<SchemaModel>,
        document: Document,
        driver: Box<dyn PersistenceDriver>,
    ) -> Self {
        debug!(document = %document.name(), driver = %driver.source_name(), "Created tag store");
        Self {
            schema,
            document,
            driver,
            tags: BTreeMap::new(),
            sequences: HashMap::new(),
            changed: false,
        }
    }

    /// Shared schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<SchemaModel> {
        &self.schema
    }

    /// Bound document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Name of the driver's backing medium
    #[must_use]
    pub fn driver_name(&self) -> String {
        self.driver.source_name()
    }

    // ------------------------------------------------------------------
    // Id generation
    // ------------------------------------------------------------------

    /// Fresh id for `tag_type`
    ///
    /// Sequences are per type prefix, strictly increasing, and skip every id
    /// this store has ever seen, so deleted ids are never handed out again.
    pub fn next_id(&mut self, tag_type: &TagType) -> TagId {
        let prefix = tag_type.prefix();
        let mut seq = self.sequences.get(prefix).copied().unwrap_or(0);
        loop {
            seq += 1;
            let id = TagId::generated(prefix, seq);
            if !self.tags.contains_key(&id) {
                self.sequences.insert(prefix.to_string(), seq);
                return id;
            }
        }
    }

    fn note_id(&mut self, id: &TagId) {
        let (prefix, seq) = id.split();
        if let Some(seq) = seq {
            let last = self.sequences.entry(prefix.to_string()).or_insert(0);
            *last = (*last).max(seq);
        }
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a tag from a complete draft
    ///
    /// Spans, text, attributes, argument bindings and (when the draft asks
    /// for them) default attributes are validated together and persisted with
    /// one driver call, so a failure stores nothing.
    ///
    /// # Errors
    /// - [`StoreError::SchemaViolation`] if the type is not part of this
    ///   schema, the draft's shape does not fit the type (spans on a link,
    ///   arguments on an extent), spans overlap or exceed the document, a
    ///   consuming type gets no spans, an attribute value is outside its value
    ///   set, or an argument targets a link tag
    /// - [`StoreError::TypeMismatch`] for undeclared attributes or arguments
    /// - [`StoreError::NotFound`] if an argument target is not live
    /// - [`StoreError::DuplicateId`] if `id` is live
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn create_tag(&mut self, id: TagId, tag_type: &TagType, draft: TagDraft) -> Result<Tag> {
        let tag_type = self.resolve_type(tag_type)?;
        if self.tags.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        let tag = if tag_type.is_extent() {
            Tag::Extent(self.build_extent(id, tag_type, draft)?)
        } else {
            Tag::Link(self.build_link(id, tag_type, draft)?)
        };
        self.insert(tag.clone())?;
        debug!(id = %tag.id(), tag_type = %tag.tag_type(), "Created tag");
        Ok(tag)
    }

    /// Create an extent tag with no attributes
    ///
    /// Spans are authoritative for the text; `text` is only used when the
    /// tag consumes nothing. Default attributes are the caller's concern (see
    /// [`populate_default_attributes`](crate::populate_default_attributes)),
    /// or use [`create_tag`](Self::create_tag) with
    /// [`TagDraft::with_defaults`].
    ///
    /// # Errors
    /// - [`StoreError::SchemaViolation`] if the type is not an extent type of
    ///   this schema, spans overlap or exceed the document, or a consuming
    ///   type gets no spans
    /// - [`StoreError::DuplicateId`] if `id` is live
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn create_extent_tag(
        &mut self,
        id: TagId,
        tag_type: &TagType,
        text: Option<&str>,
        spans: Option<&[Span]>,
    ) -> Result<ExtentTag> {
        let tag_type = self.resolve_type(tag_type)?;
        if !tag_type.is_extent() {
            return Err(StoreError::violation(format!(
                "'{tag_type}' is not an extent type"
            )));
        }
        if self.tags.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }

        let mut draft = TagDraft::new().with_spans(spans.unwrap_or(&[]));
        if let Some(text) = text {
            draft = draft.with_text(text);
        }
        let tag = self.build_extent(id, tag_type, draft)?;
        self.insert(Tag::Extent(tag.clone()))?;
        debug!(id = %tag.id, tag_type = %tag.tag_type, spans = %tag.spans, "Created extent tag");
        Ok(tag)
    }

    /// Create a link tag with every argument slot unfilled
    ///
    /// # Errors
    /// - [`StoreError::SchemaViolation`] if the type is not a link type of
    ///   this schema
    /// - [`StoreError::DuplicateId`] if `id` is live
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn create_link_tag(&mut self, id: TagId, tag_type: &TagType) -> Result<LinkTag> {
        let tag_type = self.resolve_type(tag_type)?;
        if !tag_type.is_link() {
            return Err(StoreError::violation(format!(
                "'{tag_type}' is not a link type"
            )));
        }
        if self.tags.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }

        let tag = LinkTag::empty(id, tag_type, self.document.name());
        self.insert(Tag::Link(tag.clone()))?;
        debug!(id = %tag.id, tag_type = %tag.tag_type, "Created link tag");
        Ok(tag)
    }

    fn build_extent(&self, id: TagId, tag_type: Arc<TagType>, draft: TagDraft) -> Result<ExtentTag> {
        if !draft.arguments.is_empty() {
            return Err(StoreError::violation(format!(
                "extent type '{tag_type}' has no arguments"
            )));
        }
        let attributes = draft_attributes(&tag_type, &draft)?;
        let spans = SpanSet::try_disjoint(&draft.spans)
            .ok_or_else(|| StoreError::violation("spans overlap"))?;
        let text = self.text_of(&tag_type, &spans, draft.text.as_deref().unwrap_or_default())?;
        Ok(ExtentTag {
            id,
            tag_type,
            document: self.document.name(),
            attributes,
            spans,
            text,
        })
    }

    fn build_link(&self, id: TagId, tag_type: Arc<TagType>, draft: TagDraft) -> Result<LinkTag> {
        if !draft.spans.is_empty() || draft.text.is_some() {
            return Err(StoreError::violation(format!(
                "link type '{tag_type}' takes no spans or text"
            )));
        }
        let attributes = draft_attributes(&tag_type, &draft)?;
        let mut link = LinkTag::empty(id, tag_type, self.document.name());
        link.attributes = attributes;
        for (name, target) in draft.arguments {
            if link.tag_type.argument(&name).is_none() {
                return Err(StoreError::TypeMismatch {
                    tag_type: link.tag_type.name().to_string(),
                    name,
                });
            }
            self.check_argument_target(&target)?;
            link.arguments.insert(name, Some(target));
        }
        Ok(link)
    }

    fn check_argument_target(&self, target: &TagId) -> Result<()> {
        match self.tags.get(target) {
            None => Err(StoreError::NotFound(target.clone())),
            Some(Tag::Link(_)) => Err(StoreError::violation(format!(
                "argument target {target} is a link tag"
            ))),
            Some(Tag::Extent(_)) => Ok(()),
        }
    }

    fn resolve_type(&self, tag_type: &TagType) -> Result<Arc<TagType>> {
        self.schema
            .type_by_name(tag_type.name())
            .ok_or_else(|| {
                StoreError::violation(format!(
                    "tag type '{tag_type}' is not part of schema '{}'",
                    self.schema.name()
                ))
            })
    }

    fn text_of(&self, tag_type: &TagType, spans: &SpanSet, fallback: &str) -> Result<String> {
        if spans.is_empty() {
            if !tag_type.is_non_consuming() {
                return Err(StoreError::violation(format!(
                    "'{tag_type}' is consuming and needs at least one span"
                )));
            }
            return Ok(fallback.to_string());
        }
        text_for(spans, self.document.text()).map_err(|e| StoreError::violation(e.to_string()))
    }

    fn insert(&mut self, tag: Tag) -> Result<()> {
        self.driver.insert(&TagRecord::from(&tag))?;
        self.note_id(tag.id());
        self.tags.insert(tag.id().clone(), tag);
        self.changed = true;
        Ok(())
    }

    fn replace(&mut self, tag: Tag) -> Result<()> {
        self.driver.update(&TagRecord::from(&tag))?;
        self.tags.insert(tag.id().clone(), tag);
        self.changed = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Delete a tag and every link that references it
    ///
    /// Returns the deleted tag first, then cascaded links in id order. The
    /// whole set is removed from the driver in one call before memory changes.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if `id` is not live
    /// - [`StoreError::Persistence`] if the driver refuses; nothing is deleted
    pub fn delete_tag(&mut self, id: &TagId) -> Result<Vec<Tag>> {
        let tag = self
            .tags
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut ids = vec![id.clone()];
        if tag.is_extent() {
            ids.extend(self.links_referencing(id).into_iter().map(|l| l.id.clone()));
        }

        if let Err(e) = self.driver.delete(&ids) {
            warn!(id = %id, error = %e, "Driver refused delete");
            return Err(e.into());
        }

        let removed: Vec<Tag> = ids.iter().filter_map(|i| self.tags.remove(i)).collect();
        self.changed = true;
        debug!(id = %id, cascaded = removed.len() - 1, "Deleted tag");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    /// Replace an extent tag's spans and recompute its text
    ///
    /// Returns `Ok(false)` without changing anything if the spans overlap,
    /// leave the document, or are empty for a consuming type.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if `id` is not live
    /// - [`StoreError::SchemaViolation`] if `id` names a link tag
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn update_tag_spans(&mut self, id: &TagId, spans: &[Span]) -> Result<bool> {
        let extent = self.extent(id)?;
        let Some(set) = SpanSet::try_disjoint(spans) else {
            warn!(id = %id, "Rejected overlapping spans");
            return Ok(false);
        };
        let text = match self.text_of(&extent.tag_type, &set, "") {
            Ok(text) => text,
            Err(e) => {
                warn!(id = %id, error = %e, "Rejected span update");
                return Ok(false);
            }
        };

        let mut updated = extent.clone();
        updated.spans = set;
        updated.text = text;
        self.replace(Tag::Extent(updated))?;
        debug!(id = %id, "Updated spans");
        Ok(true)
    }

    /// Set the text of an extent tag that currently has no spans
    ///
    /// Returns `Ok(false)` if the tag owns spans (its text then derives from
    /// them).
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if `id` is not live
    /// - [`StoreError::SchemaViolation`] if `id` names a link tag
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn update_tag_text(&mut self, id: &TagId, text: &str) -> Result<bool> {
        let extent = self.extent(id)?;
        if !extent.spans.is_empty() {
            warn!(id = %id, "Text of a consuming tag follows its spans");
            return Ok(false);
        }
        let mut updated = extent.clone();
        updated.text = text.to_string();
        self.replace(Tag::Extent(updated))?;
        Ok(true)
    }

    /// Bind one argument slot of a link tag to an extent tag
    ///
    /// Returns `Ok(None)` if `argument` is not declared by the link's type.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if either tag is not live
    /// - [`StoreError::SchemaViolation`] if `link` is not a link tag or
    ///   `target` is not an extent tag
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn add_or_update_argument(
        &mut self,
        link: &TagId,
        argument: &ArgumentType,
        target: &TagId,
    ) -> Result<Option<LinkTag>> {
        let current = self.link(link)?;
        if !current.tag_type.declares_argument(argument) {
            warn!(link = %link, argument = argument.name(), "Argument not declared by link type");
            return Ok(None);
        }
        self.check_argument_target(target)?;

        let mut updated = current.clone();
        updated
            .arguments
            .insert(argument.name().to_string(), Some(target.clone()));
        self.replace(Tag::Link(updated.clone()))?;
        debug!(link = %link, argument = argument.name(), target = %target, "Bound argument");
        Ok(Some(updated))
    }

    /// Unfill one argument slot
    ///
    /// Returns `Ok(None)` if `argument` is not declared by the link's type.
    ///
    /// # Errors
    /// Same as [`add_or_update_argument`](Self::add_or_update_argument)
    pub fn clear_argument(&mut self, link: &TagId, argument: &ArgumentType) -> Result<Option<LinkTag>> {
        let current = self.link(link)?;
        if !current.tag_type.declares_argument(argument) {
            return Ok(None);
        }
        let mut updated = current.clone();
        updated.arguments.insert(argument.name().to_string(), None);
        self.replace(Tag::Link(updated.clone()))?;
        Ok(Some(updated))
    }

    /// Set one attribute value
    ///
    /// An empty value unsets the attribute. Returns `Ok(None)` if the value is
    /// outside the attribute's value set.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if `id` is not live
    /// - [`StoreError::TypeMismatch`] if the tag's type does not declare
    ///   `attribute`
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn add_attribute(
        &mut self,
        id: &TagId,
        attribute: &AttributeType,
        value: &str,
    ) -> Result<Option<Attribute>> {
        let tag = self.tag(id)?;
        if !tag.tag_type().declares_attribute(attribute) {
            return Err(StoreError::TypeMismatch {
                tag_type: tag.tag_type().name().to_string(),
                name: attribute.name().to_string(),
            });
        }
        if !attribute.allows(value) {
            warn!(id = %id, attribute = attribute.name(), value, "Value outside value set");
            return Ok(None);
        }

        let mut updated = tag.clone();
        if value.is_empty() {
            updated.attributes_mut().remove(attribute.name());
        } else {
            updated
                .attributes_mut()
                .insert(attribute.name().to_string(), value.to_string());
        }
        self.replace(updated)?;
        debug!(id = %id, attribute = attribute.name(), value, "Set attribute");
        Ok(Some(Attribute {
            tag: id.clone(),
            name: attribute.name().to_string(),
            value: value.to_string(),
        }))
    }

    /// Unset one attribute; `Ok(false)` if it was not set
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if `id` is not live
    /// - [`StoreError::Persistence`] if the driver refuses
    pub fn remove_attribute(&mut self, id: &TagId, name: &str) -> Result<bool> {
        let tag = self.tag(id)?;
        if !tag.attributes().contains_key(name) {
            return Ok(false);
        }
        let mut updated = tag.clone();
        updated.attributes_mut().remove(name);
        self.replace(updated)?;
        Ok(true)
    }

    /// Set several attributes with one driver call, skipping undeclared names
    pub(crate) fn merge_attributes(
        &mut self,
        id: &TagId,
        values: Vec<(String, String)>,
    ) -> Result<Vec<Attribute>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let mut updated = self.tag(id)?.clone();
        for (name, value) in &values {
            updated.attributes_mut().insert(name.clone(), value.clone());
        }
        self.replace(updated)?;
        Ok(values
            .into_iter()
            .map(|(name, value)| Attribute {
                tag: id.clone(),
                name,
                value,
            })
            .collect())
    }

    fn tag(&self, id: &TagId) -> Result<&Tag> {
        self.tags
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn extent(&self, id: &TagId) -> Result<&ExtentTag> {
        match self.tag(id)? {
            Tag::Extent(t) => Ok(t),
            Tag::Link(_) => Err(StoreError::violation(format!("{id} is a link tag"))),
        }
    }

    fn link(&self, id: &TagId) -> Result<&LinkTag> {
        match self.tag(id)? {
            Tag::Link(t) => Ok(t),
            Tag::Extent(_) => Err(StoreError::violation(format!("{id} is an extent tag"))),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Tag by id
    #[inline]
    #[must_use]
    pub fn get_tag_by_tid(&self, id: &TagId) -> Option<&Tag> {
        self.tags.get(id)
    }

    /// All tags in id order
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// Extent tags whose spans intersect any of `ranges`, in id order
    #[must_use]
    pub fn get_tags_in(&self, ranges: &[Span]) -> Vec<&ExtentTag> {
        self.extents()
            .filter(|t| t.spans.intersects_any(ranges))
            .collect()
    }

    /// Anchors covered by tags of `tag_type`, minus those covered by any
    /// tag of an excluded type
    #[must_use]
    pub fn get_all_anchors_of_tag_type(
        &self,
        tag_type: &TagType,
        exclude: &[&TagType],
    ) -> BTreeSet<Anchor> {
        let mut anchors: BTreeSet<Anchor> = self
            .extents()
            .filter(|t| t.tag_type.as_ref() == tag_type)
            .flat_map(ExtentTag::anchors)
            .collect();
        if anchors.is_empty() || exclude.is_empty() {
            return anchors;
        }
        for tag in self
            .extents()
            .filter(|t| exclude.iter().any(|ex| t.tag_type.as_ref() == *ex))
        {
            for anchor in tag.anchors() {
                anchors.remove(&anchor);
            }
        }
        anchors
    }

    /// Anchors a tag highlights: its own spans, or its arguments' spans
    #[must_use]
    pub fn get_anchors_by_tid(&self, id: &TagId) -> BTreeSet<Anchor> {
        match self.tags.get(id) {
            Some(Tag::Extent(t)) => t.anchors().collect(),
            Some(Tag::Link(l)) => self
                .argument_tags(&l.id)
                .into_iter()
                .flat_map(|(_, t)| t.anchors())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Tags of one type in id order
    #[must_use]
    pub fn tags_of_type(&self, tag_type: &TagType) -> Vec<&Tag> {
        self.tags
            .values()
            .filter(|t| t.tag_type().as_ref() == tag_type)
            .collect()
    }

    /// Link tags with `extent` in any slot, in id order
    #[must_use]
    pub fn links_referencing(&self, extent: &TagId) -> Vec<&LinkTag> {
        self.tags
            .values()
            .filter_map(Tag::as_link)
            .filter(|l| l.references(extent))
            .collect()
    }

    /// Filled arguments of a link tag, in slot order
    #[must_use]
    pub fn argument_tags(&self, link: &TagId) -> Vec<(&str, &ExtentTag)> {
        let Some(Tag::Link(l)) = self.tags.get(link) else {
            return Vec::new();
        };
        l.arguments
            .iter()
            .filter_map(|(name, target)| {
                let target = target.as_ref()?;
                let extent = self.tags.get(target)?.as_extent()?;
                Some((name.as_str(), extent))
            })
            .collect()
    }

    /// Text describing a link: its filled arguments' texts joined with
    /// [`LINK_TEXT_SEPARATOR`]
    #[must_use]
    pub fn link_text(&self, link: &TagId) -> Option<String> {
        self.tags.get(link)?.as_link()?;
        let parts: Vec<&str> = self
            .argument_tags(link)
            .into_iter()
            .map(|(_, t)| t.text())
            .collect();
        Some(parts.join(LINK_TEXT_SEPARATOR))
    }

    fn extents(&self) -> impl Iterator<Item = &ExtentTag> {
        self.tags.values().filter_map(Tag::as_extent)
    }

    /// Number of live tags
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if the store holds no tags
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    // ------------------------------------------------------------------
    // Change tracking
    // ------------------------------------------------------------------

    /// Check if anything was mutated since load or the last save
    #[inline]
    #[must_use]
    pub fn is_annotation_changed(&self) -> bool {
        self.changed
    }

    /// Record that the current state has been saved
    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    // ------------------------------------------------------------------
    // Bulk
    // ------------------------------------------------------------------

    /// Import pre-existing tag records
    ///
    /// All records are validated before any is stored; extents are imported
    /// before links so links may reference extents from the same batch.
    /// Seeding does not count as a change. Returns the number of tags added.
    ///
    /// # Errors
    /// - [`StoreError::SchemaViolation`] for unknown types or shapes that do
    ///   not fit the type
    /// - [`StoreError::TypeMismatch`] for undeclared attributes or arguments
    /// - [`StoreError::DuplicateId`] for ids already live or repeated
    /// - [`StoreError::NotFound`] for links to unknown extent tags
    /// - [`StoreError::Persistence`] if the driver refuses; records inserted
    ///   so far are rolled back
    pub fn seed(&mut self, records: &[TagRecord]) -> Result<usize> {
        let mut staged: BTreeMap<TagId, Tag> = BTreeMap::new();
        let (extents, links): (Vec<&TagRecord>, Vec<&TagRecord>) = records
            .iter()
            .partition(|r| self.schema.type_by_name(&r.tag_type).is_some_and(|t| t.is_extent()));

        for record in extents.into_iter().chain(links) {
            if self.tags.contains_key(&record.id) || staged.contains_key(&record.id) {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
            let tag = self.tag_from_record(record, &staged)?;
            staged.insert(record.id.clone(), tag);
        }

        let mut inserted: Vec<TagId> = Vec::with_capacity(staged.len());
        for (id, tag) in &staged {
            if let Err(e) = self.driver.insert(&TagRecord::from(tag)) {
                warn!(id = %id, error = %e, "Driver refused seed record, rolling back");
                if let Err(rollback) = self.driver.delete(&inserted) {
                    warn!(error = %rollback, "Seed rollback failed");
                }
                return Err(e.into());
            }
            inserted.push(id.clone());
        }

        let count = staged.len();
        for (id, tag) in staged {
            self.note_id(&id);
            self.tags.insert(id, tag);
        }
        info!(document = %self.document.name(), tags = count, "Seeded tag store");
        Ok(count)
    }

    fn tag_from_record(&self, record: &TagRecord, staged: &BTreeMap<TagId, Tag>) -> Result<Tag> {
        let tag_type = self.schema.type_by_name(&record.tag_type).ok_or_else(|| {
            StoreError::violation(format!(
                "record {} has unknown tag type '{}'",
                record.id, record.tag_type
            ))
        })?;

        let mut attributes = BTreeMap::new();
        for (name, value) in &record.attributes {
            let att = tag_type
                .attribute(name)
                .ok_or_else(|| StoreError::TypeMismatch {
                    tag_type: tag_type.name().to_string(),
                    name: name.clone(),
                })?;
            if !att.allows(value) {
                return Err(StoreError::violation(format!(
                    "record {}: '{value}' is not allowed for '{name}'",
                    record.id
                )));
            }
            if !value.is_empty() {
                attributes.insert(name.clone(), value.clone());
            }
        }

        if tag_type.is_extent() {
            if !record.arguments.is_empty() {
                return Err(StoreError::violation(format!(
                    "extent record {} has arguments",
                    record.id
                )));
            }
            let spans = record.spans.clone().unwrap_or_default();
            let text = self.text_of(&tag_type, &spans, record.text.as_deref().unwrap_or_default())?;
            return Ok(Tag::Extent(ExtentTag {
                id: record.id.clone(),
                tag_type,
                document: self.document.name(),
                attributes,
                spans,
                text,
            }));
        }

        if record.spans.is_some() {
            return Err(StoreError::violation(format!(
                "link record {} has spans",
                record.id
            )));
        }
        let mut link = LinkTag::empty(record.id.clone(), tag_type, self.document.name());
        link.attributes = attributes;
        for (name, target) in &record.arguments {
            if link.tag_type.argument(name).is_none() {
                return Err(StoreError::TypeMismatch {
                    tag_type: link.tag_type.name().to_string(),
                    name: name.clone(),
                });
            }
            if let Some(target) = target {
                let found = self.tags.get(target).or_else(|| staged.get(target));
                match found {
                    None => return Err(StoreError::NotFound(target.clone())),
                    Some(Tag::Link(_)) => {
                        return Err(StoreError::violation(format!(
                            "link record {} targets link {target}",
                            record.id
                        )))
                    }
                    Some(Tag::Extent(_)) => {}
                }
            }
            link.arguments.insert(name.clone(), target.clone());
        }
        Ok(Tag::Link(link))
    }

    /// Order-stable snapshot of the driver's records
    ///
    /// Tags are ordered by type declaration order, then id.
    ///
    /// # Errors
    /// [`StoreError::Persistence`] if the driver cannot export
    pub fn export(&self) -> Result<DocumentSnapshot> {
        let mut records = self.driver.export()?;
        records.sort_by(|a, b| {
            let pa = self.schema.position_of(&a.tag_type).unwrap_or(usize::MAX);
            let pb = self.schema.position_of(&b.tag_type).unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| a.id.cmp(&b.id))
        });
        Ok(DocumentSnapshot {
            task: self.schema.name().to_string(),
            document: self.document.name(),
            text: self.document.text().to_string(),
            tags: records,
        })
    }

    /// Drop every tag and release the driver
    ///
    /// # Errors
    /// [`StoreError::Persistence`] if the driver fails to release
    pub fn destroy(&mut self) -> Result<()> {
        self.driver.destroy()?;
        self.tags.clear();
        info!(document = %self.document.name(), "Destroyed tag store");
        Ok(())
    }
}

/// Attribute map a draft starts with: explicit values, then defaults
fn draft_attributes(tag_type: &TagType, draft: &TagDraft) -> Result<BTreeMap<String, String>> {
    let mut attributes = BTreeMap::new();
    for (name, value) in &draft.attributes {
        let att = tag_type
            .attribute(name)
            .ok_or_else(|| StoreError::TypeMismatch {
                tag_type: tag_type.name().to_string(),
                name: name.clone(),
            })?;
        if !att.allows(value) {
            return Err(StoreError::violation(format!(
                "'{value}' is not allowed for '{name}'"
            )));
        }
        if value.is_empty() {
            attributes.remove(name);
        } else {
            attributes.insert(name.clone(), value.clone());
        }
    }
    if draft.defaults {
        for att in tag_type.attributes() {
            if let Some(default) = att.default_value().filter(|d| !d.is_empty()) {
                attributes
                    .entry(att.name().to_string())
                    .or_insert_with(|| default.to_string());
            }
        }
    }
    Ok(attributes)
}
