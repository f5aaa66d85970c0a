//! Tagbench Session
//!
//! Multi-document annotation sessions over one shared schema.
//!
//! # Overview
//!
//! - [`SessionManager`]: loads the schema, opens and closes documents, routes
//!   every tag intent to the current document's store
//! - [`RepaintTracker`]: anchors to recolor when the current document changes
//! - Adjudication: one target document, read-only sources, tag copying
//! - [`SessionConfig`]: TOML-loadable behavior switches
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagbench_schema::{SchemaDefinition, TagTypeDefinition};
//! use tagbench_session::{SessionConfig, SessionManager, TextDocument};
//! use tagbench_span::Span;
//!
//! let definition = SchemaDefinition::new("ner").tag(TagTypeDefinition::extent("PERSON"));
//! let mut session = SessionManager::new(SessionConfig::default());
//! session.load_schema(Arc::new(definition)).unwrap();
//!
//! let opened = session.open_document(&TextDocument::new("a.txt", "John ran")).unwrap();
//! assert_eq!(opened.index, 0);
//!
//! let outcome = session.create_tag("PERSON", &[Span::new(0, 4).unwrap()]).unwrap();
//! assert_eq!(outcome.repaint.len(), 4);
//! assert_eq!(session.unsaved_documents(), vec!["a.txt".to_string()]);
//! ```

#![warn(missing_docs)]

mod adjudication;
mod config;
mod document;
mod error;
mod mode;
mod outcome;
mod repaint;
mod session;

pub use config::{ConfigError, SessionConfig};
pub use document::{DocumentError, DocumentSource, LoadedDocument, SnapshotFile, TextDocument};
pub use error::{Result, SessionError};
pub use mode::AnnotationMode;
pub use outcome::{CopiedTag, EditOutcome, SourcedTag, SwitchOutcome};
pub use repaint::{anchors_of_type, RepaintTracker};
pub use session::{OpenDocument, SessionManager, TagField};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a session
    pub use crate::{
        DocumentSource, EditOutcome, SessionConfig, SessionError, SessionManager, TagField,
        TextDocument,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
