//! The schema model: a closed, recursive description of a contract value's
//! binary shape, plus the parser for the schema's own wire form.
//!
//! Every node determines its encoding procedure entirely on its own; nothing
//! in the tree needs context beyond the bytes being consumed. The tree is
//! immutable once parsed and safe to share across threads.

use bytepack::Cursor;
use bytepack::Writer;

use crate::types::Error;
use crate::types::Result;

/// Width of the length prefix used by collections and strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLength {
    U8,
    U16,
    U32,
    U64,
}

impl SizeLength {
    pub(crate) const fn from_tag(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(SizeLength::U8),
            1 => Some(SizeLength::U16),
            2 => Some(SizeLength::U32),
            3 => Some(SizeLength::U64),
            _ => None,
        }
    }

    pub(crate) const fn tag(self) -> u8 {
        match self {
            SizeLength::U8 => 0,
            SizeLength::U16 => 1,
            SizeLength::U32 => 2,
            SizeLength::U64 => 3,
        }
    }

    /// Largest count or byte length this prefix can express.
    pub const fn max_size(self) -> u64 {
        match self {
            SizeLength::U8 => u8::MAX as u64,
            SizeLength::U16 => u16::MAX as u64,
            SizeLength::U32 => u32::MAX as u64,
            SizeLength::U64 => u64::MAX,
        }
    }

    pub(crate) fn read_size(self, cursor: &mut Cursor<'_>) -> bytepack::Result<u64> {
        match self {
            SizeLength::U8 => Ok(cursor.read_u8()? as u64),
            SizeLength::U16 => Ok(cursor.read_u16()? as u64),
            SizeLength::U32 => Ok(cursor.read_u32()? as u64),
            SizeLength::U64 => cursor.read_u64(),
        }
    }

    /// Caller must have checked `size <= self.max_size()`.
    pub(crate) fn write_size(self, writer: &mut Writer, size: u64) {
        match self {
            SizeLength::U8 => {
                writer.put_u8(size as u8);
            }
            SizeLength::U16 => {
                writer.put_u16(size as u16);
            }
            SizeLength::U32 => {
                writer.put_u32(size as u32);
            }
            SizeLength::U64 => {
                writer.put_u64(size);
            }
        }
    }
}

/// How wide an enum's wire tag is for a given schema version.
///
/// Legacy (unversioned V0/V1) schemas always spend four bytes on the tag.
/// Versioned schemas use the narrowest width that fits the declared variant
/// count. Each version is a fixed policy, never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagWidthPolicy {
    AlwaysWide,
    NarrowestFit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagWidth {
    U8,
    U16,
    U32,
}

impl TagWidthPolicy {
    pub(crate) fn width_for(self, variant_count: usize) -> TagWidth {
        match self {
            TagWidthPolicy::AlwaysWide => TagWidth::U32,
            TagWidthPolicy::NarrowestFit => {
                if variant_count <= u8::MAX as usize {
                    TagWidth::U8
                } else if variant_count <= u16::MAX as usize {
                    TagWidth::U16
                } else {
                    TagWidth::U32
                }
            }
        }
    }
}

/// Fields of a struct or of one enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    /// Named fields, as in `struct Rgb { r: u8, g: u8, b: u8 }`.
    Named(Vec<(String, SchemaType)>),
    /// Positional fields, as in `struct Point(u32, u32)`.
    Unnamed(Vec<SchemaType>),
    /// No fields at all.
    None,
}

/// One declared variant of an enum schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub fields: Fields,
}

/// The schema type tree. Tag numbers in the binary form are the discriminants
/// documented on each variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    /// 0
    Unit,
    /// 1
    Bool,
    /// 2
    U8,
    /// 3
    U16,
    /// 4
    U32,
    /// 5
    U64,
    /// 6
    I8,
    /// 7
    I16,
    /// 8
    I32,
    /// 9
    I64,
    /// 10: token amount in micro-units, u64 on the wire.
    Amount,
    /// 11: 32-byte account address.
    AccountAddress,
    /// 12: contract address: index and subindex, both u64.
    ContractAddress,
    /// 13: milliseconds since the epoch, u64.
    Timestamp,
    /// 14: a span of milliseconds, u64.
    Duration,
    /// 15
    Pair(Box<SchemaType>, Box<SchemaType>),
    /// 16
    List(SizeLength, Box<SchemaType>),
    /// 17
    Set(SizeLength, Box<SchemaType>),
    /// 18
    Map(SizeLength, Box<SchemaType>, Box<SchemaType>),
    /// 19: fixed element count, no length prefix.
    Array(u32, Box<SchemaType>),
    /// 20
    Struct(Fields),
    /// 21
    Enum(Vec<EnumVariant>),
    /// 22
    String(SizeLength),
    /// 23
    U128,
    /// 24
    I128,
    /// 25: contract name, stored as the string `init_<name>`.
    ContractName(SizeLength),
    /// 26: receive name, stored as the string `<contract>.<func>`.
    ReceiveName(SizeLength),
    /// 27: unsigned LEB128, at most this many encoded bytes.
    ULeb128(u32),
    /// 28: signed LEB128, at most this many encoded bytes.
    ILeb128(u32),
    /// 29: raw bytes with a length prefix.
    ByteList(SizeLength),
    /// 30: exactly this many raw bytes.
    ByteArray(u32),
    /// 31: enum with explicit one-byte wire tags per variant.
    TaggedEnum(Vec<(u8, EnumVariant)>),
}

pub(crate) fn parse_err(offset: usize, message: impl Into<String>) -> Error {
    Error::SchemaParse {
        offset,
        message: message.into(),
    }
}

/// Maps a byte-layer failure into a parse error at the cursor position.
pub(crate) fn read_u8(cursor: &mut Cursor<'_>) -> Result<u8> {
    let offset = cursor.pos();
    cursor
        .read_u8()
        .map_err(|_| parse_err(offset, "unexpected end of schema"))
}

pub(crate) fn read_u32(cursor: &mut Cursor<'_>) -> Result<u32> {
    let offset = cursor.pos();
    cursor
        .read_u32()
        .map_err(|_| parse_err(offset, "unexpected end of schema"))
}

/// Reads a u32-length-prefixed UTF-8 string, the form used throughout the
/// schema's own wire format.
pub(crate) fn read_string(cursor: &mut Cursor<'_>) -> Result<String> {
    let len = read_u32(cursor)? as usize;
    let offset = cursor.pos();
    let bytes = cursor
        .read_bytes(len)
        .map_err(|_| parse_err(offset, "unexpected end of schema"))?;
    let text = std::str::from_utf8(bytes)
        .map_err(|_| parse_err(offset, "schema string is not valid utf-8"))?;
    Ok(text.to_owned())
}

pub(crate) fn write_string(writer: &mut Writer, text: &str) {
    writer.put_u32(text.len() as u32);
    writer.put_bytes(text.as_bytes());
}

fn read_size_length(cursor: &mut Cursor<'_>) -> Result<SizeLength> {
    let offset = cursor.pos();
    let byte = read_u8(cursor)?;
    SizeLength::from_tag(byte).ok_or_else(|| parse_err(offset, format!("unknown size length tag: {}", byte)))
}

impl Fields {
    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let offset = cursor.pos();
        match read_u8(cursor)? {
            0 => {
                let len = read_u32(cursor)?;
                let mut fields = Vec::with_capacity(len.min(1024) as usize);
                for _ in 0..len {
                    let name = read_string(cursor)?;
                    let field = SchemaType::parse(cursor)?;
                    fields.push((name, field));
                }
                Ok(Fields::Named(fields))
            }
            1 => {
                let len = read_u32(cursor)?;
                let mut fields = Vec::with_capacity(len.min(1024) as usize);
                for _ in 0..len {
                    fields.push(SchemaType::parse(cursor)?);
                }
                Ok(Fields::Unnamed(fields))
            }
            2 => Ok(Fields::None),
            other => Err(parse_err(offset, format!("unknown fields tag: {}", other))),
        }
    }

    pub(crate) fn write(&self, writer: &mut Writer) {
        match self {
            Fields::Named(fields) => {
                writer.put_u8(0);
                writer.put_u32(fields.len() as u32);
                for (name, field) in fields {
                    write_string(writer, name);
                    field.write(writer);
                }
            }
            Fields::Unnamed(fields) => {
                writer.put_u8(1);
                writer.put_u32(fields.len() as u32);
                for field in fields {
                    field.write(writer);
                }
            }
            Fields::None => {
                writer.put_u8(2);
            }
        }
    }
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let name = read_string(cursor)?;
        let fields = Fields::parse(cursor)?;
        Ok(Self { name, fields })
    }

    fn write(&self, writer: &mut Writer) {
        write_string(writer, &self.name);
        self.fields.write(writer);
    }
}

impl SchemaType {
    /// Parses a standalone schema type, e.g. the parameter schema for a
    /// single entrypoint shipped out-of-band.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        Self::parse(&mut cursor)
    }

    /// Serializes the schema type back to its binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.write(&mut writer);
        writer.into_bytes()
    }

    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let offset = cursor.pos();
        let tag = read_u8(cursor)?;
        let parsed = match tag {
            0 => SchemaType::Unit,
            1 => SchemaType::Bool,
            2 => SchemaType::U8,
            3 => SchemaType::U16,
            4 => SchemaType::U32,
            5 => SchemaType::U64,
            6 => SchemaType::I8,
            7 => SchemaType::I16,
            8 => SchemaType::I32,
            9 => SchemaType::I64,
            10 => SchemaType::Amount,
            11 => SchemaType::AccountAddress,
            12 => SchemaType::ContractAddress,
            13 => SchemaType::Timestamp,
            14 => SchemaType::Duration,
            15 => {
                let first = Self::parse(cursor)?;
                let second = Self::parse(cursor)?;
                SchemaType::Pair(Box::new(first), Box::new(second))
            }
            16 => {
                let size_len = read_size_length(cursor)?;
                SchemaType::List(size_len, Box::new(Self::parse(cursor)?))
            }
            17 => {
                let size_len = read_size_length(cursor)?;
                SchemaType::Set(size_len, Box::new(Self::parse(cursor)?))
            }
            18 => {
                let size_len = read_size_length(cursor)?;
                let key = Self::parse(cursor)?;
                let value = Self::parse(cursor)?;
                SchemaType::Map(size_len, Box::new(key), Box::new(value))
            }
            19 => {
                let size = read_u32(cursor)?;
                SchemaType::Array(size, Box::new(Self::parse(cursor)?))
            }
            20 => SchemaType::Struct(Fields::parse(cursor)?),
            21 => {
                let len = read_u32(cursor)?;
                let mut variants = Vec::with_capacity(len.min(1024) as usize);
                for _ in 0..len {
                    variants.push(EnumVariant::parse(cursor)?);
                }
                SchemaType::Enum(variants)
            }
            22 => SchemaType::String(read_size_length(cursor)?),
            23 => SchemaType::U128,
            24 => SchemaType::I128,
            25 => SchemaType::ContractName(read_size_length(cursor)?),
            26 => SchemaType::ReceiveName(read_size_length(cursor)?),
            27 => SchemaType::ULeb128(read_u32(cursor)?),
            28 => SchemaType::ILeb128(read_u32(cursor)?),
            29 => SchemaType::ByteList(read_size_length(cursor)?),
            30 => SchemaType::ByteArray(read_u32(cursor)?),
            31 => {
                let len = read_u32(cursor)?;
                let mut variants = Vec::with_capacity(len.min(1024) as usize);
                for _ in 0..len {
                    let wire_tag = read_u8(cursor)?;
                    variants.push((wire_tag, EnumVariant::parse(cursor)?));
                }
                SchemaType::TaggedEnum(variants)
            }
            other => return Err(parse_err(offset, format!("unknown type tag: {}", other))),
        };
        Ok(parsed)
    }

    pub(crate) fn write(&self, writer: &mut Writer) {
        match self {
            SchemaType::Unit => {
                writer.put_u8(0);
            }
            SchemaType::Bool => {
                writer.put_u8(1);
            }
            SchemaType::U8 => {
                writer.put_u8(2);
            }
            SchemaType::U16 => {
                writer.put_u8(3);
            }
            SchemaType::U32 => {
                writer.put_u8(4);
            }
            SchemaType::U64 => {
                writer.put_u8(5);
            }
            SchemaType::I8 => {
                writer.put_u8(6);
            }
            SchemaType::I16 => {
                writer.put_u8(7);
            }
            SchemaType::I32 => {
                writer.put_u8(8);
            }
            SchemaType::I64 => {
                writer.put_u8(9);
            }
            SchemaType::Amount => {
                writer.put_u8(10);
            }
            SchemaType::AccountAddress => {
                writer.put_u8(11);
            }
            SchemaType::ContractAddress => {
                writer.put_u8(12);
            }
            SchemaType::Timestamp => {
                writer.put_u8(13);
            }
            SchemaType::Duration => {
                writer.put_u8(14);
            }
            SchemaType::Pair(first, second) => {
                writer.put_u8(15);
                first.write(writer);
                second.write(writer);
            }
            SchemaType::List(size_len, item) => {
                writer.put_u8(16).put_u8(size_len.tag());
                item.write(writer);
            }
            SchemaType::Set(size_len, item) => {
                writer.put_u8(17).put_u8(size_len.tag());
                item.write(writer);
            }
            SchemaType::Map(size_len, key, value) => {
                writer.put_u8(18).put_u8(size_len.tag());
                key.write(writer);
                value.write(writer);
            }
            SchemaType::Array(size, item) => {
                writer.put_u8(19).put_u32(*size);
                item.write(writer);
            }
            SchemaType::Struct(fields) => {
                writer.put_u8(20);
                fields.write(writer);
            }
            SchemaType::Enum(variants) => {
                writer.put_u8(21).put_u32(variants.len() as u32);
                for variant in variants {
                    variant.write(writer);
                }
            }
            SchemaType::String(size_len) => {
                writer.put_u8(22).put_u8(size_len.tag());
            }
            SchemaType::U128 => {
                writer.put_u8(23);
            }
            SchemaType::I128 => {
                writer.put_u8(24);
            }
            SchemaType::ContractName(size_len) => {
                writer.put_u8(25).put_u8(size_len.tag());
            }
            SchemaType::ReceiveName(size_len) => {
                writer.put_u8(26).put_u8(size_len.tag());
            }
            SchemaType::ULeb128(max) => {
                writer.put_u8(27).put_u32(*max);
            }
            SchemaType::ILeb128(max) => {
                writer.put_u8(28).put_u32(*max);
            }
            SchemaType::ByteList(size_len) => {
                writer.put_u8(29).put_u8(size_len.tag());
            }
            SchemaType::ByteArray(size) => {
                writer.put_u8(30).put_u32(*size);
            }
            SchemaType::TaggedEnum(variants) => {
                writer.put_u8(31).put_u32(variants.len() as u32);
                for (wire_tag, variant) in variants {
                    writer.put_u8(*wire_tag);
                    variant.write(writer);
                }
            }
        }
    }
}
