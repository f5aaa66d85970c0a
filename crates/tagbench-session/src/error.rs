//! Session errors

use crate::document::DocumentError;
use std::path::PathBuf;
use tagbench_schema::SchemaParseError;
use tagbench_span::SpanFormatError;
use tagbench_store::StoreError;

/// Errors from session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Schema could not be loaded; the prior schema stays in effect
    #[error("schema error: {0}")]
    Schema(#[from] SchemaParseError),

    /// Tag store rejected the operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Document source could not be read
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Serialized spans are malformed
    #[error("invalid spans: {0}")]
    SpanFormat(#[from] SpanFormatError),

    /// Snapshot could not be written
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded
    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Document already open at this absolute path
    #[error("document already open: {}", .0.display())]
    DuplicatePath(PathBuf),

    /// Operation needs a loaded schema
    #[error("no schema loaded")]
    NoSchema,

    /// Operation needs a current document
    #[error("no document open")]
    NoDocument,

    /// Document index past the open list
    #[error("document index {index} out of range ({len} open)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Adjudication operation outside adjudication
    #[error("not adjudicating")]
    NotAdjudicating,

    /// Mutation of an adjudication source document
    #[error("document '{0}' is read-only while adjudicating")]
    ReadOnlyDocument(String),

    /// Tag type not creatable in the current mode
    #[error("tag type '{0}' is not available")]
    TypeUnavailable(String),

    /// Tag type not in the schema
    #[error("unknown tag type: {0}")]
    UnknownTagType(String),

    /// Target document's schema lacks the copied tag's type
    #[error("document '{document}' has no tag type '{tag_type}'")]
    TypeMismatch { tag_type: String, document: String },
}

impl SessionError {
    /// Check if the operation was rejected for its input, with no mutation
    #[must_use]
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Store(e) => e.is_validation(),
            Self::SpanFormat(_)
            | Self::DuplicatePath(_)
            | Self::ReadOnlyDocument(_)
            | Self::TypeUnavailable(_)
            | Self::UnknownTagType(_)
            | Self::TypeMismatch { .. } => true,
            _ => false,
        }
    }
}

/// Result alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_validation_passes_through() {
        let err = SessionError::from(StoreError::SchemaViolation("spans on link".into()));
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "schema violation: spans on link");
    }

    #[test]
    fn lifecycle_errors_are_not_validation() {
        assert!(!SessionError::NoSchema.is_validation());
        assert!(!SessionError::IndexOutOfRange { index: 3, len: 1 }.is_validation());
        assert!(SessionError::DuplicatePath("/tmp/a.txt".into()).is_validation());
    }
}
