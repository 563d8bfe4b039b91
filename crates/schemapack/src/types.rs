use std::error;
use std::fmt;

use bytepack::Error as ByteError;

pub type Result<T> = std::result::Result<T, Error>;

/// What a failed schema lookup was asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTarget {
    Contract,
    Entrypoint,
    Parameter,
    ReturnValue,
    ErrorValue,
    State,
    Event,
}

impl fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupTarget::Contract => "contract",
            LookupTarget::Entrypoint => "entrypoint",
            LookupTarget::Parameter => "parameter schema",
            LookupTarget::ReturnValue => "return value schema",
            LookupTarget::ErrorValue => "error schema",
            LookupTarget::State => "state schema",
            LookupTarget::Event => "event schema",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The schema bytes did not start with the two-byte 0xFF 0xFF prefix
    /// that marks a versioned module schema.
    MissingVersionPrefix,
    /// The schema declared a version this crate does not understand.
    UnsupportedVersion { found: u8 },
    /// The schema bytes themselves were malformed, at the given byte offset.
    SchemaParse { offset: usize, message: String },
    /// The module schema has no entry for the requested contract,
    /// entrypoint, or schema kind. Expected for contracts that do not
    /// publish every schema; distinct from a codec failure.
    SchemaNotFound {
        contract: String,
        entrypoint: Option<String>,
        target: LookupTarget,
    },
    /// The value handed to the encoder did not match the schema shape, or
    /// exceeded a numeric or length bound.
    Serialization(String),
    /// Decoding needed more bytes than the buffer had left.
    Underflow { expected: usize, remaining: usize },
    /// Bytes remained after the outermost value was decoded.
    TrailingBytes { count: usize },
    /// An enum tag on the wire matched no declared variant.
    UnknownVariant { tag: u32 },
}

impl Error {
    pub(crate) fn ser(message: impl Into<String>) -> Self {
        Error::Serialization(message.into())
    }
}

impl From<ByteError> for Error {
    fn from(err: ByteError) -> Self {
        match err {
            ByteError::Underflow { expected, remaining } => Error::Underflow { expected, remaining },
            ByteError::InvalidUtf8 => Error::Serialization("string data is not valid utf-8".into()),
            ByteError::LebOverflow { max_bytes } => {
                Error::Serialization(format!("leb128 value exceeds {} bytes", max_bytes))
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingVersionPrefix => {
                write!(f, "schema bytes are missing the versioned-module prefix")
            }
            Error::UnsupportedVersion { found } => {
                write!(f, "unsupported module schema version: {}", found)
            }
            Error::SchemaParse { offset, message } => {
                write!(f, "malformed schema at byte {}: {}", offset, message)
            }
            Error::SchemaNotFound { contract, entrypoint: Some(ep), target } => {
                write!(f, "no {} for entrypoint '{}.{}'", target, contract, ep)
            }
            Error::SchemaNotFound { contract, entrypoint: None, target } => {
                write!(f, "no {} for contract '{}'", target, contract)
            }
            Error::Serialization(msg) => write!(f, "value does not fit schema: {}", msg),
            Error::Underflow { expected, remaining } => {
                write!(f, "buffer underflow: needed {} bytes, {} remaining", expected, remaining)
            }
            Error::TrailingBytes { count } => {
                write!(f, "{} trailing bytes after decoded value", count)
            }
            Error::UnknownVariant { tag } => write!(f, "unknown enum variant tag: {}", tag),
        }
    }
}

impl error::Error for Error {}
