//! # Schemapack
//!
//! A codec for smart-contract schemas. A contract module publishes a binary
//! description of the shapes its entrypoints expect; this crate parses that
//! description, selects the sub-schema for a contract or entrypoint, and
//! uses it to turn JSON-like values into contract wire bytes and raw
//! state/return bytes back into structured values.
//!
//! The pipeline, end to end:
//!
//! 1. [`wasm::embedded_schema`] pulls schema bytes out of a module's custom
//!    section (or the caller supplies a standalone schema file).
//! 2. [`ModuleSchema::from_bytes`] parses them into the versioned schema
//!    tree.
//! 3. Lookup methods pick the [`SchemaType`] for an init parameter, receive
//!    parameter, return value, error, state, or event.
//! 4. [`encode_value`] / [`decode_value`] run that schema against a
//!    [`Value`] or a byte buffer.
//!
//! Everything is synchronous and pure: no I/O, no shared mutable state, and
//! every decode call threads its own [`bytepack::Cursor`].

pub mod types;
pub mod schema;
pub mod module;
pub mod wasm;
pub mod value;
pub mod json;
pub mod encode;
pub mod decode;

pub use types::Error;
pub use types::LookupTarget;
pub use types::Result;

pub use schema::EnumVariant;
pub use schema::Fields;
pub use schema::SchemaType;
pub use schema::SizeLength;
pub use schema::TagWidthPolicy;

pub use module::ContractV0;
pub use module::ContractV1;
pub use module::ContractV2;
pub use module::ContractV3;
pub use module::FunctionV1;
pub use module::FunctionV2;
pub use module::ModuleSchema;

pub use wasm::embedded_schema;
pub use wasm::module_schema_from_wasm;
pub use wasm::EmbeddedSchema;

pub use json::from_json;
pub use json::to_json;

pub use value::Number;
pub use value::Value;

pub use encode::encode_value;
pub use decode::decode_value;
pub use decode::decode_value_exact;

#[cfg(test)]
mod tests;
