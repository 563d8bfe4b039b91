//! # Bytepack
//!
//! The byte-level floor of the schema codec: a bounds-checked cursor over a
//! borrowed slice, an append-only output buffer, and little-endian scalar
//! reads and writes for every fixed width up to 128 bits, plus LEB128.
//!
//! Nothing here knows about schemas. Higher layers decide *what* to read;
//! this crate only guarantees that reads never run past the end of the
//! input and that every failure says how many bytes were missing.

mod macros;

pub mod types;
pub mod cursor;
pub mod writer;

pub use types::Error;
pub use types::Result;

pub use cursor::Cursor;
pub use writer::Writer;

#[cfg(test)]
mod tests;
