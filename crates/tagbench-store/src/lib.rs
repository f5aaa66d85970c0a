//! Tagbench Tag Store
//!
//! Per-document tag instances and the rules that keep them consistent.
//!
//! # Overview
//!
//! - [`TagStore`]: tags of one document, backed by a [`PersistenceDriver`]
//! - [`Tag`]: closed union of [`ExtentTag`] (spans of text) and [`LinkTag`]
//!   (relation over extent tags by id)
//! - Consistency rules: [`populate_default_attributes`],
//!   [`check_completeness`], and cascading delete in [`TagStore::delete_tag`]
//! - [`TagDraft`]: a new tag's full initial contents, created in one step
//!   by [`TagStore::create_tag`]
//! - [`DocumentSnapshot`]: order-stable export
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagbench_schema::{SchemaDefinition, TagTypeDefinition};
//! use tagbench_span::Span;
//! use tagbench_store::{Document, TagStore};
//!
//! let schema = SchemaDefinition::new("ner")
//!     .tag(TagTypeDefinition::extent("PERSON"))
//!     .tag(TagTypeDefinition::link("RELATION").argument("arg1"))
//!     .build()
//!     .unwrap();
//! let mut store = TagStore::new(Arc::new(schema), Document::new("a.txt", "John ran"));
//!
//! let person = store.schema().type_by_name("PERSON").unwrap();
//! let id = store.next_id(&person);
//! let tag = store
//!     .create_extent_tag(id, &person, None, Some(&[Span::new(0, 4).unwrap()]))
//!     .unwrap();
//! assert_eq!(tag.text(), "John");
//!
//! let removed = store.delete_tag(tag.id()).unwrap();
//! assert_eq!(removed.len(), 1);
//! assert!(store.is_empty());
//! ```

#![warn(missing_docs)]

mod document;
mod draft;
mod driver;
mod error;
mod export;
mod record;
mod rules;
mod store;
mod tag;

pub use document::Document;
pub use draft::TagDraft;
pub use driver::{JsonFileDriver, MemoryDriver, PersistenceDriver};
pub use error::{PersistenceError, Result, StoreError};
pub use export::DocumentSnapshot;
pub use record::TagRecord;
pub use rules::{check_completeness, is_complete, missing_fields, populate_default_attributes, MissingField};
pub use store::{TagStore, LINK_TEXT_SEPARATOR};
pub use tag::{Attribute, ExtentTag, LinkTag, Tag, TagId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with tag stores
    pub use crate::{
        check_completeness, populate_default_attributes, Document, ExtentTag, LinkTag,
        PersistenceDriver, StoreError, Tag, TagDraft, TagId, TagStore,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
