//! Deterministic JSON: serialization whose output depends only on content.
//!
//! Object keys are sorted by code point at every depth, so two values that
//! differ only in key insertion order produce byte-identical text. Parsing
//! returns values that are already sorted. Containers that contain themselves
//! (built through a [`Graph`]) are rejected instead of looping.
//!
//! ```
//! use deterministic_json::{deserialize, serialize, Indent};
//!
//! let value = deserialize(r#"{"b":1,"a":{"d":[3,2],"c":null}}"#).unwrap();
//! assert_eq!(
//!     serialize(&value, None).unwrap(),
//!     r#"{"a":{"c":null,"d":[3,2]},"b":1}"#
//! );
//! assert_eq!(
//!     serialize(&value, Some(Indent::Spaces(1))).unwrap(),
//!     "{\n \"a\": {\n  \"c\": null,\n  \"d\": [\n   3,\n   2\n  ]\n },\n \"b\": 1\n}"
//! );
//! ```
#![deny(missing_docs)]

/// Recursive key sorting with cycle and depth checks.
pub mod canonicalizer;
/// Parsing with canonicalization and revivers.
pub mod deserializer;
/// Content digests over canonical text.
pub mod digest;
/// Error type shared by all operations.
pub mod error;
/// Arena for shared and cyclic structures.
pub mod graph;
/// Sorted key enumeration.
pub mod keys;
mod number;
/// Host value reduction and replacers.
pub mod reduce;
/// Rendering of canonical text.
pub mod serializer;
/// The structured value model.
pub mod value;

pub use canonicalizer::{canonicalize, Canonicalizer, Limits, DEFAULT_MAX_DEPTH};
pub use deserializer::{deserialize, deserialize_as, deserialize_with};
pub use digest::{Digest, DigestAlg};
pub use error::{Error, Result};
pub use graph::{Graph, Item, NodeId};
pub use keys::keys;
pub use reduce::{Reduce, Replacer, Serde};
pub use serializer::{serialize, to_string, Indent, Serializer};
pub use value::{Map, Number, Value};
