//! Tag store and persistence errors

use crate::tag::TagId;
use std::path::PathBuf;

/// Errors from tag store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Operation incompatible with the tag type's declared shape
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Attribute or argument not declared by the tag's type
    #[error("'{name}' is not declared by tag type '{tag_type}'")]
    TypeMismatch { tag_type: String, name: String },

    /// Unknown tag id
    #[error("tag not found: {0}")]
    NotFound(TagId),

    /// Id already live in this store
    #[error("duplicate tag id: {0}")]
    DuplicateId(TagId),

    /// Backing driver failure
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl StoreError {
    /// Check if the operation was rejected for its input, with no mutation
    ///
    /// Validation failures can be retried with corrected input; persistence
    /// failures cannot.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SchemaViolation(_) | Self::TypeMismatch { .. } | Self::DuplicateId(_)
        )
    }

    pub(crate) fn violation(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }
}

/// Failures reported by a [`PersistenceDriver`](crate::PersistenceDriver)
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Backing file could not be read or written
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Records could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Update or delete of an id the driver does not hold
    #[error("no record for tag {0}")]
    MissingRecord(TagId),

    /// Insert of an id the driver already holds
    #[error("record for tag {0} already exists")]
    DuplicateRecord(TagId),

    /// Driver was destroyed with its store
    #[error("driver has been destroyed")]
    Destroyed,

    /// Any other backend failure
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_classification() {
        assert!(StoreError::violation("spans on link").is_validation());
        assert!(StoreError::TypeMismatch {
            tag_type: "PERSON".into(),
            name: "arg1".into()
        }
        .is_validation());
        assert!(!StoreError::NotFound(TagId::new("P1")).is_validation());
        assert!(!StoreError::from(PersistenceError::Destroyed).is_validation());
    }

    #[test]
    fn messages_are_lowercase() {
        let err = StoreError::NotFound(TagId::new("P3"));
        assert_eq!(err.to_string(), "tag not found: P3");
    }
}
