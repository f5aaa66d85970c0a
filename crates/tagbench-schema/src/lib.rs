//! Tagbench Schema Model
//!
//! Immutable description of one annotation task: which tag types exist,
//! which attributes they carry, and which argument slots link types declare.
//!
//! # Overview
//!
//! - **TagType**: extent (anchors text, optionally non-consuming) or link
//!   (connects extent tags through named argument slots)
//! - **AttributeType**: default value, optional value set, required flag
//! - **ArgumentType**: one slot of a link type
//! - **SchemaModel**: declaration-ordered set of tag types, shared by every
//!   tag store of a session
//!
//! # Example
//!
//! ```rust
//! use tagbench_schema::{AttributeDefinition, SchemaDefinition, TagTypeDefinition};
//!
//! let schema = SchemaDefinition::new("ner")
//!     .tag(
//!         TagTypeDefinition::extent("PERSON")
//!             .attribute(AttributeDefinition::new("role").with_default("subject")),
//!     )
//!     .tag(TagTypeDefinition::link("RELATION").argument("arg1").argument("arg2"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.extent_types().len(), 1);
//! assert!(schema.type_by_name("RELATION").unwrap().is_link());
//! ```

#![warn(missing_docs)]

mod error;
mod schema;
mod source;
mod tag_type;

pub use error::SchemaParseError;
pub use schema::SchemaModel;
pub use source::{
    load_schema, AttributeDefinition, KindDefinition, SchemaDefinition, SchemaFile, SchemaSource,
    TagTypeDefinition,
};
pub use tag_type::{ArgumentType, AttributeType, TagKind, TagType};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for schema construction
    pub use crate::{
        AttributeDefinition, SchemaDefinition, SchemaModel, SchemaSource, TagType,
        TagTypeDefinition,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
