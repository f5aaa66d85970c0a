//! Schema load errors

use std::path::PathBuf;

/// Malformed or missing schema source
///
/// Fatal to the load attempt only; a session keeps its prior schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaParseError {
    /// Source file could not be read
    #[error("failed to read schema '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON definition is malformed
    #[error("invalid JSON schema definition: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML definition is malformed
    #[error("invalid YAML schema definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension names no known definition format
    #[error("unsupported schema format: '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    /// Task, type, attribute or argument without a name
    #[error("empty name in {0}")]
    EmptyName(String),

    /// Two tag types share a name
    #[error("duplicate tag type: {0}")]
    DuplicateType(String),

    /// Two tag types share an id prefix
    #[error("tag types '{first}' and '{second}' share id prefix '{prefix}'")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },

    /// One type declares the same attribute twice
    #[error("duplicate attribute '{name}' on tag type '{tag_type}'")]
    DuplicateAttribute { tag_type: String, name: String },

    /// One link type declares the same argument twice
    #[error("duplicate argument '{name}' on link type '{tag_type}'")]
    DuplicateArgument { tag_type: String, name: String },

    /// Argument slots declared on an extent type
    #[error("extent type '{0}' cannot declare arguments")]
    ArgumentsOnExtent(String),

    /// Link type marked non-consuming
    #[error("link type '{0}' cannot be non-consuming")]
    NonConsumingLink(String),

    /// Default value violates the attribute's own value set
    #[error("default '{default}' of '{tag_type}.{attribute}' is not in its value set")]
    DefaultOutsideValueSet {
        tag_type: String,
        attribute: String,
        default: String,
    },
}
