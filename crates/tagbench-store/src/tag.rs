//! Tag instances
//!
//! Provides the closed [`Tag`] union over [`ExtentTag`] and [`LinkTag`],
//! and the [`TagId`] they are keyed by.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tagbench_schema::TagType;
use tagbench_span::{Anchor, SpanSet};

/// Store-unique tag identifier, `<prefix><sequence>`
///
/// Orders naturally: `P2` sorts before `P10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    /// Wrap an existing id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id generated from a type prefix and sequence number
    #[inline]
    #[must_use]
    pub fn generated(prefix: &str, sequence: u64) -> Self {
        Self(format!("{prefix}{sequence}"))
    }

    /// Raw id string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into non-numeric prefix and trailing sequence number
    #[must_use]
    pub fn split(&self) -> (&str, Option<u64>) {
        let prefix = self.0.trim_end_matches(|c: char| c.is_ascii_digit());
        let digits = &self.0[prefix.len()..];
        (prefix, digits.parse().ok())
    }

    /// Sequence number if this id carries `prefix`
    #[must_use]
    pub fn sequence_for(&self, prefix: &str) -> Option<u64> {
        match self.split() {
            (p, Some(seq)) if p == prefix => Some(seq),
            _ => None,
        }
    }
}

impl Ord for TagId {
    fn cmp(&self, other: &Self) -> Ordering {
        let (pa, na) = self.split();
        let (pb, nb) = other.split();
        pa.cmp(pb)
            .then_with(|| na.cmp(&nb))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TagId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for TagId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One attribute value on one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Owning tag
    pub tag: TagId,
    /// Attribute type name
    pub name: String,
    /// Current value, empty when cleared
    pub value: String,
}

/// Tag instance, closed over its two variants
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// Anchored to spans of text
    Extent(ExtentTag),
    /// Relation between extent tags
    Link(LinkTag),
}

impl Tag {
    /// Tag id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TagId {
        match self {
            Self::Extent(t) => &t.id,
            Self::Link(t) => &t.id,
        }
    }

    /// Owning tag type
    #[inline]
    #[must_use]
    pub fn tag_type(&self) -> &Arc<TagType> {
        match self {
            Self::Extent(t) => &t.tag_type,
            Self::Link(t) => &t.tag_type,
        }
    }

    /// Owning document name (provenance)
    #[inline]
    #[must_use]
    pub fn document(&self) -> &str {
        match self {
            Self::Extent(t) => &t.document,
            Self::Link(t) => &t.document,
        }
    }

    /// Attribute values by attribute name
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Extent(t) => &t.attributes,
            Self::Link(t) => &t.attributes,
        }
    }

    /// Value of one attribute, `None` when unset
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes().get(name).map(String::as_str)
    }

    /// Extent variant, if this is one
    #[inline]
    #[must_use]
    pub fn as_extent(&self) -> Option<&ExtentTag> {
        match self {
            Self::Extent(t) => Some(t),
            Self::Link(_) => None,
        }
    }

    /// Link variant, if this is one
    #[inline]
    #[must_use]
    pub fn as_link(&self) -> Option<&LinkTag> {
        match self {
            Self::Link(t) => Some(t),
            Self::Extent(_) => None,
        }
    }

    /// Check if this is an extent tag
    #[inline]
    #[must_use]
    pub fn is_extent(&self) -> bool {
        matches!(self, Self::Extent(_))
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        match self {
            Self::Extent(t) => &mut t.attributes,
            Self::Link(t) => &mut t.attributes,
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extent(t) => write!(f, "{} ({}) \"{}\"", t.id, t.tag_type, t.text),
            Self::Link(t) => write!(f, "{} ({})", t.id, t.tag_type),
        }
    }
}

/// Tag anchored to zero or more spans of its document
///
/// # Invariants
/// - `text` always equals the text covered by `spans` unless `spans` is empty
/// - `spans` is empty only if the type is non-consuming
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentTag {
    pub(crate) id: TagId,
    pub(crate) tag_type: Arc<TagType>,
    pub(crate) document: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) spans: SpanSet,
    pub(crate) text: String,
}

impl ExtentTag {
    /// Tag id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TagId {
        &self.id
    }

    /// Owning tag type
    #[inline]
    #[must_use]
    pub fn tag_type(&self) -> &Arc<TagType> {
        &self.tag_type
    }

    /// Owning document name
    #[inline]
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Attribute values
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Normalized spans
    #[inline]
    #[must_use]
    pub fn spans(&self) -> &SpanSet {
        &self.spans
    }

    /// Cached text of the spans (authoritative when there are none)
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if the tag currently consumes no text
    #[inline]
    #[must_use]
    pub fn is_non_consuming(&self) -> bool {
        self.spans.is_empty()
    }

    /// Every covered anchor
    pub fn anchors(&self) -> impl Iterator<Item = Anchor> + '_ {
        self.spans.anchors()
    }

    /// Same type over the identical span set
    #[must_use]
    pub fn is_equivalent(&self, other: &ExtentTag) -> bool {
        self.tag_type == other.tag_type && self.spans == other.spans
    }
}

/// Relation between extent tags through named argument slots
///
/// Arguments are weak: a slot holds the id of an extent tag, looked up
/// through the store, never the tag itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTag {
    pub(crate) id: TagId,
    pub(crate) tag_type: Arc<TagType>,
    pub(crate) document: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) arguments: IndexMap<String, Option<TagId>>,
}

impl LinkTag {
    pub(crate) fn empty(id: TagId, tag_type: Arc<TagType>, document: String) -> Self {
        let arguments = tag_type
            .arguments()
            .iter()
            .map(|a| (a.name().to_string(), None))
            .collect();
        Self {
            id,
            tag_type,
            document,
            attributes: BTreeMap::new(),
            arguments,
        }
    }

    /// Tag id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TagId {
        &self.id
    }

    /// Owning tag type
    #[inline]
    #[must_use]
    pub fn tag_type(&self) -> &Arc<TagType> {
        &self.tag_type
    }

    /// Owning document name
    #[inline]
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Attribute values
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Every slot in declaration order, unfilled slots included
    pub fn arguments(&self) -> impl Iterator<Item = (&str, Option<&TagId>)> {
        self.arguments
            .iter()
            .map(|(name, target)| (name.as_str(), target.as_ref()))
    }

    /// Target of one slot
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&TagId> {
        self.arguments.get(name).and_then(Option::as_ref)
    }

    /// Names of slots with no target
    pub fn unfilled_arguments(&self) -> impl Iterator<Item = &str> {
        self.arguments
            .iter()
            .filter(|(_, target)| target.is_none())
            .map(|(name, _)| name.as_str())
    }

    /// Check if every slot is filled
    #[must_use]
    pub fn is_fully_bound(&self) -> bool {
        self.arguments.values().all(Option::is_some)
    }

    /// Check if any slot points at `extent`
    #[must_use]
    pub fn references(&self, extent: &TagId) -> bool {
        self.arguments.values().any(|t| t.as_ref() == Some(extent))
    }
}
