//! Core types for the byte layer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A read needed `expected` bytes but only `remaining` were left.
    Underflow { expected: usize, remaining: usize },
    /// Bytes that should hold text were not valid UTF-8.
    InvalidUtf8,
    /// A LEB128 value did not terminate within `max_bytes`, or overflowed
    /// the 128-bit result.
    LebOverflow { max_bytes: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Underflow { expected, remaining } => {
                write!(f, "buffer underflow: needed {} bytes, {} remaining", expected, remaining)
            }
            Error::InvalidUtf8 => write!(f, "invalid utf-8"),
            Error::LebOverflow { max_bytes } => {
                write!(f, "leb128 value exceeds {} bytes", max_bytes)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
