//! Tag, attribute and argument types
//!
//! Provides [`TagType`] with its [`AttributeType`]s and [`ArgumentType`]s.
//! All of these are immutable once a schema is built.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Shape of a tag type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Anchors text
    Extent {
        /// May exist with zero spans
        non_consuming: bool,
    },

    /// Connects extent tags through argument slots
    Link,
}

/// One category of tag in a schema
///
/// Equality and hashing use the name only; names are unique within a schema.
#[derive(Debug, Clone, Serialize)]
pub struct TagType {
    name: String,
    prefix: String,
    kind: TagKind,
    attributes: Vec<AttributeType>,
    arguments: Vec<ArgumentType>,
}

impl TagType {
    pub(crate) fn new(
        name: String,
        prefix: String,
        kind: TagKind,
        attributes: Vec<AttributeType>,
        arguments: Vec<ArgumentType>,
    ) -> Self {
        Self {
            name,
            prefix,
            kind,
            attributes,
            arguments,
        }
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix of generated tag ids
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extent or link
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// Check if tags of this type anchor text
    #[inline]
    #[must_use]
    pub fn is_extent(&self) -> bool {
        matches!(self.kind, TagKind::Extent { .. })
    }

    /// Check if tags of this type link extent tags
    #[inline]
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self.kind, TagKind::Link)
    }

    /// Check if tags of this type may have zero spans
    #[inline]
    #[must_use]
    pub fn is_non_consuming(&self) -> bool {
        matches!(self.kind, TagKind::Extent { non_consuming: true })
    }

    /// Attribute types in declaration order
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[AttributeType] {
        &self.attributes
    }

    /// Argument slots in declaration order (empty for extent types)
    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[ArgumentType] {
        &self.arguments
    }

    /// Attribute type by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeType> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Argument type by name
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&ArgumentType> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Check if `att` is one of this type's attribute types
    #[must_use]
    pub fn declares_attribute(&self, att: &AttributeType) -> bool {
        att.tag_type == self.name && self.attribute(&att.name).is_some()
    }

    /// Check if `arg` is one of this type's argument slots
    #[must_use]
    pub fn declares_argument(&self, arg: &ArgumentType) -> bool {
        arg.tag_type == self.name && self.argument(&arg.name).is_some()
    }

    /// Attribute types that must be non-empty for a tag to be complete
    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeType> {
        self.attributes.iter().filter(|a| a.required)
    }
}

impl PartialEq for TagType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TagType {}

impl Hash for TagType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Display for TagType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Attribute declared by exactly one tag type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeType {
    name: String,
    tag_type: String,
    default_value: Option<String>,
    value_set: Option<Vec<String>>,
    required: bool,
}

impl AttributeType {
    pub(crate) fn new(
        name: String,
        tag_type: String,
        default_value: Option<String>,
        value_set: Option<Vec<String>>,
        required: bool,
    ) -> Self {
        Self {
            name,
            tag_type,
            default_value: default_value.filter(|d| !d.is_empty()),
            value_set,
            required,
        }
    }

    /// Attribute name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning tag type
    #[inline]
    #[must_use]
    pub fn tag_type(&self) -> &str {
        &self.tag_type
    }

    /// Non-empty default, if any
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Finite set of allowed values, if constrained
    #[inline]
    #[must_use]
    pub fn value_set(&self) -> Option<&[String]> {
        self.value_set.as_deref()
    }

    /// Must be non-empty for completeness
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Check if `value` satisfies the value-set constraint
    ///
    /// The empty value (unset) is always allowed.
    #[must_use]
    pub fn allows(&self, value: &str) -> bool {
        value.is_empty()
            || self
                .value_set
                .as_ref()
                .map_or(true, |set| set.iter().any(|v| v == value))
    }
}

/// Argument slot declared by exactly one link type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArgumentType {
    name: String,
    tag_type: String,
}

impl ArgumentType {
    pub(crate) fn new(name: String, tag_type: String) -> Self {
        Self { name, tag_type }
    }

    /// Slot name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning link type
    #[inline]
    #[must_use]
    pub fn tag_type(&self) -> &str {
        &self.tag_type
    }
}
