//! Bidirectional Schema Translation Engine
//!
//! Translates resource descriptions between two device ecosystems: a bus
//! side that describes interfaces with wire type signatures, and a resource
//! side that describes them with a portable JSON-Schema-like document.
//!
//! ## Components
//!
//! - [`ident`]: reversible name mangling between the two identifier grammars
//! - [`schema`]: the typed schema fragment model
//! - [`type_map`]: wire signature ↔ schema fragment mapping
//! - [`well_known`]: the fixed catalogue of names excluded from generic
//!   translation, shared by both directions
//! - [`generator`]: native descriptors → portable schema document
//! - [`parser`]: portable schema document → native descriptors plus
//!   per-path object wiring
//! - [`document`]: the document model and its compact binary encoding
//!
//! The engine is synchronous and free of shared state: every generation or
//! parse call builds its own annotation table and intermediate trees and
//! discards them on return, so concurrent calls need no synchronization.

pub mod document;
pub mod generator;
pub mod ident;
pub mod parser;
pub mod schema;
pub mod type_map;
pub mod well_known;

// Re-exports for convenience
pub use document::{
    tree_from_cbor, DocumentInfo, Operation, Parameter, PathItem, Response, SchemaDocument,
};
pub use generator::SchemaGenerator;
pub use ident::{
    argument_property_name, decode_name, decode_path_segment, encode_name, encode_path_segment,
};
pub use parser::{ParsedPeer, SchemaParser, VirtualObject};
pub use schema::{MediaEncoding, SchemaFragment, SchemaItems, SchemaType};
pub use type_map::{schema_to_signature, signature_to_schema, NumericOverrides};
