//! Tagbench Span Engine
//!
//! Pure arithmetic over half-open character ranges of a document.
//!
//! # Core Concepts
//!
//! - [`Span`]: a single `[start, end)` range in character offsets
//! - [`SpanSet`]: a normalized (sorted, merged) set of spans owned by one tag
//! - [`parse`] / [`serialize`]: the `start~end,start~end` text form;
//!   [`parse_spans`] keeps raw pairs and [`parse_disjoint`] rejects overlap
//! - [`text_for`]: text covered by a span set, discontiguous parts joined by
//!   [`DISCONTIGUOUS_SEPARATOR`]
//!
//! # Example
//!
//! ```rust
//! use tagbench_span::{parse, serialize, text_for, Span, SpanSet};
//!
//! let spans = SpanSet::union([Span::new(6, 11).unwrap(), Span::new(0, 5).unwrap()]);
//! assert_eq!(serialize(&spans), "0~5,6~11");
//! assert_eq!(parse("0~5,6~11").unwrap(), spans);
//! assert_eq!(text_for(&spans, "hello world").unwrap(), "hello ... world");
//! ```

#![warn(missing_docs)]

mod codec;
mod set;
mod span;
mod text;

pub use codec::{parse, parse_disjoint, parse_spans, serialize, SpanFormatError, LEGACY_EMPTY_MARKER};
pub use set::{contains, union, validate_disjoint, SpanSet};
pub use span::{intersects, Anchor, Span};
pub use text::{char_len, text_for, OutOfBounds, DISCONTIGUOUS_SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
