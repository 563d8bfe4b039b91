//! Schema-directed decoding: wire bytes in, value tree out.

use bytepack::Cursor;

use chrono::SecondsFormat;
use chrono::TimeZone;
use chrono::Utc;

use crate::schema::Fields;
use crate::schema::SchemaType;
use crate::schema::SizeLength;
use crate::schema::TagWidth;
use crate::schema::TagWidthPolicy;
use crate::types::Error;
use crate::types::Result;
use crate::value::Number;
use crate::value::Value;

/// Decodes one value from the cursor, leaving it positioned after the value.
pub fn decode_value(
    schema: &SchemaType,
    cursor: &mut Cursor<'_>,
    policy: TagWidthPolicy,
) -> Result<Value> {
    match schema {
        SchemaType::Unit => Ok(Value::Unit),
        SchemaType::Bool => match cursor.read_u8()? {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            other => Err(Error::ser(format!("invalid bool byte {:#04x}", other))),
        },
        SchemaType::U8 => Ok(Value::number(cursor.read_u8()?)),
        SchemaType::U16 => Ok(Value::number(cursor.read_u16()?)),
        SchemaType::U32 => Ok(Value::number(cursor.read_u32()?)),
        SchemaType::U64 => Ok(Value::number(cursor.read_u64()?)),
        SchemaType::U128 => Ok(Value::number(cursor.read_u128()?)),
        SchemaType::I8 => Ok(Value::number(cursor.read_i8()?)),
        SchemaType::I16 => Ok(Value::number(cursor.read_i16()?)),
        SchemaType::I32 => Ok(Value::number(cursor.read_i32()?)),
        SchemaType::I64 => Ok(Value::number(cursor.read_i64()?)),
        SchemaType::I128 => Ok(Value::number(cursor.read_i128()?)),
        SchemaType::Amount => {
            // Micro-units as a decimal string, so JSON consumers keep precision.
            Ok(Value::string(cursor.read_u64()?.to_string()))
        }
        SchemaType::AccountAddress => {
            let bytes = cursor.read_bytes(32)?;
            Ok(Value::string(hex::encode(bytes)))
        }
        SchemaType::ContractAddress => {
            let index = cursor.read_u64()?;
            let subindex = cursor.read_u64()?;
            Ok(Value::object([
                ("index", Value::number(index)),
                ("subindex", Value::number(subindex)),
            ]))
        }
        SchemaType::Timestamp => {
            let millis = cursor.read_u64()?;
            Ok(render_timestamp(millis))
        }
        SchemaType::Duration => Ok(Value::number(cursor.read_u64()?)),
        SchemaType::Pair(first, second) => {
            let a = decode_value(first, cursor, policy)?;
            let b = decode_value(second, cursor, policy)?;
            Ok(Value::Array(vec![a, b]))
        }
        SchemaType::List(size_len, item) | SchemaType::Set(size_len, item) => {
            let count = read_count(*size_len, cursor)?;
            let mut items = Vec::new();
            for _ in 0..count {
                items.push(decode_value(item, cursor, policy)?);
            }
            Ok(Value::Array(items))
        }
        SchemaType::Map(size_len, key, val) => {
            let count = read_count(*size_len, cursor)?;
            let mut entries = Vec::new();
            for _ in 0..count {
                let k = decode_value(key, cursor, policy)?;
                let v = decode_value(val, cursor, policy)?;
                entries.push(Value::Array(vec![k, v]));
            }
            Ok(Value::Array(entries))
        }
        SchemaType::Array(size, item) => {
            let mut items = Vec::new();
            for _ in 0..*size {
                items.push(decode_value(item, cursor, policy)?);
            }
            Ok(Value::Array(items))
        }
        SchemaType::Struct(fields) => decode_fields(fields, cursor, policy),
        SchemaType::Enum(variants) => {
            let tag = match policy.width_for(variants.len()) {
                TagWidth::U8 => cursor.read_u8()? as u32,
                TagWidth::U16 => cursor.read_u16()? as u32,
                TagWidth::U32 => cursor.read_u32()?,
            };
            let variant = variants
                .get(tag as usize)
                .ok_or(Error::UnknownVariant { tag })?;
            let payload = decode_fields(&variant.fields, cursor, policy)?;
            Ok(Value::object([(variant.name.clone(), payload)]))
        }
        SchemaType::TaggedEnum(variants) => {
            let byte = cursor.read_u8()?;
            let variant = variants
                .iter()
                .find(|(tag, _)| *tag == byte)
                .map(|(_, variant)| variant)
                .ok_or(Error::UnknownVariant { tag: byte as u32 })?;
            let payload = decode_fields(&variant.fields, cursor, policy)?;
            Ok(Value::object([(variant.name.clone(), payload)]))
        }
        SchemaType::String(size_len) => Ok(Value::string(read_string(*size_len, cursor)?)),
        SchemaType::ContractName(size_len) => {
            let full = read_string(*size_len, cursor)?;
            let name = full
                .strip_prefix("init_")
                .ok_or_else(|| Error::ser(format!("contract name '{}' lacks the init_ prefix", full)))?;
            Ok(Value::object([("contract", Value::string(name))]))
        }
        SchemaType::ReceiveName(size_len) => {
            let full = read_string(*size_len, cursor)?;
            let (contract, func) = full
                .split_once('.')
                .ok_or_else(|| Error::ser(format!("receive name '{}' lacks a '.' separator", full)))?;
            Ok(Value::object([
                ("contract", Value::string(contract)),
                ("func", Value::string(func)),
            ]))
        }
        SchemaType::ULeb128(max_bytes) => {
            let v = cursor.read_uleb128(*max_bytes as usize)?;
            Ok(Value::Number(Number::Unsigned(v)))
        }
        SchemaType::ILeb128(max_bytes) => {
            let v = cursor.read_sleb128(*max_bytes as usize)?;
            Ok(Value::Number(Number::Signed(v)))
        }
        SchemaType::ByteList(size_len) => {
            let count = read_count(*size_len, cursor)?;
            let bytes = cursor.read_bytes(count)?;
            Ok(Value::string(hex::encode(bytes)))
        }
        SchemaType::ByteArray(size) => {
            let bytes = cursor.read_bytes(*size as usize)?;
            Ok(Value::string(hex::encode(bytes)))
        }
    }
}

/// Like [`decode_value`] but requires the buffer to hold exactly one value.
pub fn decode_value_exact(
    schema: &SchemaType,
    bytes: &[u8],
    policy: TagWidthPolicy,
) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    let value = decode_value(schema, &mut cursor, policy)?;
    if !cursor.is_at_end() {
        return Err(Error::TrailingBytes {
            count: cursor.remaining(),
        });
    }
    Ok(value)
}

fn read_count(size_len: SizeLength, cursor: &mut Cursor<'_>) -> Result<usize> {
    let count = size_len.read_size(cursor)?;
    usize::try_from(count).map_err(|_| Error::ser(format!("length {} exceeds the address space", count)))
}

fn read_string(size_len: SizeLength, cursor: &mut Cursor<'_>) -> Result<String> {
    let count = read_count(size_len, cursor)?;
    let bytes = cursor.read_bytes(count)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| Error::ser("string bytes are not valid utf-8"))
}

fn decode_fields(fields: &Fields, cursor: &mut Cursor<'_>, policy: TagWidthPolicy) -> Result<Value> {
    match fields {
        Fields::Named(declared) => {
            let mut out = Vec::with_capacity(declared.len());
            for (name, field_schema) in declared {
                out.push((name.clone(), decode_value(field_schema, cursor, policy)?));
            }
            Ok(Value::Object(out))
        }
        Fields::Unnamed(declared) => {
            let mut out = Vec::with_capacity(declared.len());
            for field_schema in declared {
                out.push(decode_value(field_schema, cursor, policy)?);
            }
            Ok(Value::Array(out))
        }
        Fields::None => Ok(Value::Array(Vec::new())),
    }
}

/// Renders millis since the epoch as RFC 3339; values past chrono's range
/// fall back to the raw number.
fn render_timestamp(millis: u64) -> Value {
    let in_range = i64::try_from(millis)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
    match in_range {
        Some(dt) => Value::string(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => Value::number(millis),
    }
}
