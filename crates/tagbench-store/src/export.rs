//! Document snapshots
//!
//! [`DocumentSnapshot`] is the order-stable export of one document's tags,
//! handed to an external writer or saved as JSON.

use crate::record::TagRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete state of one annotated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Task (schema) name
    pub task: String,

    /// Document base name
    pub document: String,

    /// Document text
    pub text: String,

    /// Tags in type declaration order, then id order
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

impl DocumentSnapshot {
    /// Parse a snapshot from JSON
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Tag counts per type name
    #[must_use]
    pub fn counts_by_type(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.tags {
            *counts.entry(record.tag_type.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_json_and_counts() {
        let snapshot = DocumentSnapshot {
            task: "ner".into(),
            document: "doc.txt".into(),
            text: "John met Mary".into(),
            tags: vec![
                TagRecord::extent("P1", "PERSON", "0~4".parse().unwrap()),
                TagRecord::extent("P2", "PERSON", "9~13".parse().unwrap()),
                TagRecord::link("R1", "RELATION"),
            ],
        };
        let json = snapshot.to_json_string().unwrap();
        let back = DocumentSnapshot::from_json_str(&json).unwrap();
        assert_eq!(back, snapshot);

        let counts = back.counts_by_type();
        assert_eq!(counts.get("PERSON"), Some(&2));
        assert_eq!(counts.get("RELATION"), Some(&1));
    }

    #[test]
    fn missing_tags_field_means_empty() {
        let snapshot =
            DocumentSnapshot::from_json_str(r#"{"task":"ner","document":"a.txt","text":"hi"}"#)
                .unwrap();
        assert!(snapshot.tags.is_empty());
    }
}
