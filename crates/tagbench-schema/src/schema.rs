//! Schema model for one annotation task
//!
//! Provides [`SchemaModel`], the read-only set of tag types shared by every
//! tag store in a session.

use crate::tag_type::{ArgumentType, AttributeType, TagType};
use indexmap::IndexMap;
use std::sync::Arc;

/// Immutable description of one task's tag types
///
/// Types keep their declaration order, which is also the export order.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    name: String,
    types: IndexMap<String, Arc<TagType>>,
}

impl SchemaModel {
    pub(crate) fn new(name: String, types: IndexMap<String, Arc<TagType>>) -> Self {
        Self { name, types }
    }

    /// Task name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All tag types in declaration order
    #[must_use]
    pub fn all_types(&self) -> Vec<Arc<TagType>> {
        self.types.values().cloned().collect()
    }

    /// Extent tag types in declaration order
    #[must_use]
    pub fn extent_types(&self) -> Vec<Arc<TagType>> {
        self.types
            .values()
            .filter(|t| t.is_extent())
            .cloned()
            .collect()
    }

    /// Link tag types in declaration order
    #[must_use]
    pub fn link_types(&self) -> Vec<Arc<TagType>> {
        self.types
            .values()
            .filter(|t| t.is_link())
            .cloned()
            .collect()
    }

    /// Extent types permitted to exist with zero spans
    #[must_use]
    pub fn non_consuming_types(&self) -> Vec<Arc<TagType>> {
        self.types
            .values()
            .filter(|t| t.is_non_consuming())
            .cloned()
            .collect()
    }

    /// Tag type by name
    #[inline]
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<Arc<TagType>> {
        self.types.get(name).cloned()
    }

    /// Check if `tag_type` belongs to this schema
    #[inline]
    #[must_use]
    pub fn contains(&self, tag_type: &TagType) -> bool {
        self.types.contains_key(tag_type.name())
    }

    /// Declaration position of a type (export ordering key)
    #[inline]
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.types.get_index_of(name)
    }

    /// Attribute type of a tag type by name
    #[must_use]
    pub fn attribute_type(&self, tag_type: &str, name: &str) -> Option<&AttributeType> {
        self.types.get(tag_type)?.attribute(name)
    }

    /// Argument type of a link type by name
    #[must_use]
    pub fn argument_type(&self, tag_type: &str, name: &str) -> Option<&ArgumentType> {
        self.types.get(tag_type)?.argument(name)
    }

    /// Number of tag types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if schema declares no types
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::source::{AttributeDefinition, SchemaDefinition, TagTypeDefinition};

    fn schema() -> super::SchemaModel {
        SchemaDefinition::new("ner")
            .tag(
                TagTypeDefinition::extent("PERSON")
                    .attribute(AttributeDefinition::new("role").with_default("subject")),
            )
            .tag(TagTypeDefinition::extent("EVENT").non_consuming())
            .tag(
                TagTypeDefinition::link("RELATION")
                    .prefix("R")
                    .argument("arg1")
                    .argument("arg2"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn schema_partitions_types_in_order() {
        let s = schema();
        let extents: Vec<_> = s.extent_types().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(extents, vec!["PERSON", "EVENT"]);
        assert_eq!(s.link_types().len(), 1);
        assert_eq!(s.all_types().len(), 3);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn schema_lookups() {
        let s = schema();
        assert!(s.type_by_name("PERSON").is_some());
        assert!(s.type_by_name("PLACE").is_none());
        assert_eq!(
            s.attribute_type("PERSON", "role").unwrap().default_value(),
            Some("subject")
        );
        assert!(s.argument_type("RELATION", "arg2").is_some());
        assert!(s.argument_type("PERSON", "arg1").is_none());
        assert_eq!(s.position_of("RELATION"), Some(2));
    }

    #[test]
    fn schema_non_consuming_types() {
        let s = schema();
        let nc = s.non_consuming_types();
        assert_eq!(nc.len(), 1);
        assert_eq!(nc[0].name(), "EVENT");
    }
}
