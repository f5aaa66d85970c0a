//! Flat tag records
//!
//! [`TagRecord`] is the driver-facing and interchange form of a tag: plain
//! strings and ids, no shared type handles.

use crate::tag::{Tag, TagId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tagbench_span::SpanSet;

/// One tag as persisted and exported
///
/// Attributes follow the type's declaration order; arguments list every slot,
/// with `None` for unfilled ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Tag id
    pub id: TagId,

    /// Tag type name
    pub tag_type: String,

    /// Spans (extent tags only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spans: Option<SpanSet>,

    /// Text (extent tags only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Attribute values by name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    /// Argument targets by slot name (link tags only)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, Option<TagId>>,
}

impl TagRecord {
    /// Record of an extent tag
    #[must_use]
    pub fn extent(id: impl Into<TagId>, tag_type: impl Into<String>, spans: SpanSet) -> Self {
        Self {
            id: id.into(),
            tag_type: tag_type.into(),
            spans: Some(spans),
            text: None,
            attributes: IndexMap::new(),
            arguments: IndexMap::new(),
        }
    }

    /// Record of a link tag
    #[must_use]
    pub fn link(id: impl Into<TagId>, tag_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_type: tag_type.into(),
            spans: None,
            text: None,
            attributes: IndexMap::new(),
            arguments: IndexMap::new(),
        }
    }

    /// Set the text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set one attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Bind one argument slot
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, target: impl Into<TagId>) -> Self {
        self.arguments.insert(name.into(), Some(target.into()));
        self
    }

    /// Check if the record carries a span set (extent records always do)
    #[inline]
    #[must_use]
    pub fn is_extent(&self) -> bool {
        self.spans.is_some()
    }
}

impl From<&Tag> for TagRecord {
    fn from(tag: &Tag) -> Self {
        let tag_type = tag.tag_type();
        // Declared attributes first, in declaration order
        let mut attributes: IndexMap<String, String> = tag_type
            .attributes()
            .iter()
            .filter_map(|a| {
                tag.attribute(a.name())
                    .map(|v| (a.name().to_string(), v.to_string()))
            })
            .collect();
        for (name, value) in tag.attributes() {
            if !attributes.contains_key(name) {
                attributes.insert(name.clone(), value.clone());
            }
        }

        match tag {
            Tag::Extent(e) => Self {
                id: e.id.clone(),
                tag_type: tag_type.name().to_string(),
                spans: Some(e.spans.clone()),
                text: Some(e.text.clone()),
                attributes,
                arguments: IndexMap::new(),
            },
            Tag::Link(l) => Self {
                id: l.id.clone(),
                tag_type: tag_type.name().to_string(),
                spans: None,
                text: None,
                attributes,
                arguments: l.arguments.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbench_span::parse;

    #[test]
    fn extent_record_json_shape() {
        let record = TagRecord::extent("P1", "PERSON", parse("0~4").unwrap())
            .with_text("John")
            .with_attribute("role", "subject");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "P1",
                "tag_type": "PERSON",
                "spans": "0~4",
                "text": "John",
                "attributes": { "role": "subject" }
            })
        );
    }

    #[test]
    fn link_record_keeps_unfilled_slots() {
        let mut record = TagRecord::link("R1", "RELATION").with_argument("arg1", "P1");
        record.arguments.insert("arg2".into(), None);
        let json = serde_json::to_string(&record).unwrap();
        let back: TagRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.arguments.get("arg2"), Some(&None));
        assert!(!back.is_extent());
    }

    #[test]
    fn overlapping_record_spans_do_not_deserialize() {
        let json = r#"{"id": "P1", "tag_type": "PERSON", "spans": "0~5,3~8"}"#;
        let err = serde_json::from_str::<TagRecord>(json).unwrap_err();
        assert!(err.to_string().contains("overlapping spans"));

        let json = r#"{"id": "P1", "tag_type": "PERSON", "spans": "0~4,4~8"}"#;
        let record: TagRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.spans.map(|s| s.to_string()).as_deref(), Some("0~8"));
    }
}
