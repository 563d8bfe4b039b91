//! Schema-directed encoding: value tree in, wire bytes out.
//!
//! Encoding is a pure function of (schema, value, tag policy). The value's
//! shape must structurally match the schema node; any mismatch or
//! out-of-range scalar aborts the whole call with a `Serialization` error
//! and no partial output escapes.

use bytepack::Writer;

use crate::schema::Fields;
use crate::schema::SchemaType;
use crate::schema::SizeLength;
use crate::schema::TagWidth;
use crate::schema::TagWidthPolicy;
use crate::types::Error;
use crate::types::Result;
use crate::value::Number;
use crate::value::Value;

/// Encodes `value` against `schema`, producing the contract wire format.
pub fn encode_value(schema: &SchemaType, value: &Value, policy: TagWidthPolicy) -> Result<Vec<u8>> {
    let mut writer = Writer::new();
    write_value(schema, value, policy, &mut writer)?;
    Ok(writer.into_bytes())
}

/// Pulls an unsigned integer out of a value, accepting decimal strings for
/// callers whose JSON cannot carry the full range.
fn unsigned_in(value: &Value, max: u128, what: &str) -> Result<u128> {
    let n = match value {
        Value::Number(n) => n
            .as_u128()
            .ok_or_else(|| Error::ser(format!("{} cannot be negative", what)))?,
        Value::String(s) => s
            .trim()
            .parse::<u128>()
            .map_err(|_| Error::ser(format!("cannot parse '{}' as {}", s, what)))?,
        other => {
            return Err(Error::ser(format!(
                "expected a number for {}, got {}",
                what,
                other.kind()
            )))
        }
    };
    if n > max {
        return Err(Error::ser(format!("{} is out of range for {}", n, what)));
    }
    Ok(n)
}

fn signed_in(value: &Value, min: i128, max: i128, what: &str) -> Result<i128> {
    let n = match value {
        Value::Number(n) => n
            .as_i128()
            .ok_or_else(|| Error::ser(format!("{} is out of range for {}", value_num(n), what)))?,
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| Error::ser(format!("cannot parse '{}' as {}", s, what)))?,
        other => {
            return Err(Error::ser(format!(
                "expected a number for {}, got {}",
                what,
                other.kind()
            )))
        }
    };
    if n < min || n > max {
        return Err(Error::ser(format!("{} is out of range for {}", n, what)));
    }
    Ok(n)
}

fn value_num(n: &Number) -> String {
    match n {
        Number::Unsigned(v) => v.to_string(),
        Number::Signed(v) => v.to_string(),
    }
}

fn expect_array<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    value
        .as_array()
        .ok_or_else(|| Error::ser(format!("expected an array for {}, got {}", what, value.kind())))
}

fn expect_object<'a>(value: &'a Value, what: &str) -> Result<&'a [(String, Value)]> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::ser(format!(
            "expected an object for {}, got {}",
            what,
            other.kind()
        ))),
    }
}

/// Writes a length prefix, refusing counts the prefix width cannot express.
fn write_size(size_len: SizeLength, count: usize, what: &str, writer: &mut Writer) -> Result<()> {
    let count = count as u64;
    if count > size_len.max_size() {
        return Err(Error::ser(format!(
            "{} length {} exceeds the schema's size prefix (max {})",
            what,
            count,
            size_len.max_size()
        )));
    }
    size_len.write_size(writer, count);
    Ok(())
}

fn write_sized_bytes(size_len: SizeLength, bytes: &[u8], what: &str, writer: &mut Writer) -> Result<()> {
    write_size(size_len, bytes.len(), what, writer)?;
    writer.put_bytes(bytes);
    Ok(())
}

fn hex_bytes(value: &Value, what: &str) -> Result<Vec<u8>> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::ser(format!("expected a hex string for {}, got {}", what, value.kind())))?;
    hex::decode(text).map_err(|_| Error::ser(format!("'{}' is not valid hex for {}", text, what)))
}

/// Milliseconds from either a raw number or an RFC 3339 timestamp string.
fn timestamp_millis(value: &Value) -> Result<u64> {
    if let Value::String(text) = value {
        if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(text) {
            let millis = parsed.timestamp_millis();
            return u64::try_from(millis)
                .map_err(|_| Error::ser(format!("timestamp '{}' is before the epoch", text)));
        }
    }
    Ok(unsigned_in(value, u64::MAX as u128, "timestamp milliseconds")? as u64)
}

/// Milliseconds from a raw number or a duration string like "10d 1h 2m 7s 1ms".
fn duration_millis(value: &Value) -> Result<u64> {
    let text = match value {
        Value::String(text) if text.trim().parse::<u128>().is_err() => text,
        _ => return Ok(unsigned_in(value, u64::MAX as u128, "duration milliseconds")? as u64),
    };
    let mut total: u64 = 0;
    for token in text.split_whitespace() {
        let digits_end = token
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::ser(format!("duration token '{}' has no unit", token)))?;
        let (digits, unit) = token.split_at(digits_end);
        let count: u64 = digits
            .parse()
            .map_err(|_| Error::ser(format!("duration token '{}' has no count", token)))?;
        let unit_millis: u64 = match unit {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            "d" => 86_400_000,
            other => return Err(Error::ser(format!("unknown duration unit '{}'", other))),
        };
        total = count
            .checked_mul(unit_millis)
            .and_then(|part| total.checked_add(part))
            .ok_or_else(|| Error::ser(format!("duration '{}' overflows u64 milliseconds", text)))?;
    }
    Ok(total)
}

fn uleb128_byte_len(v: u128) -> u32 {
    let bits = 128 - v.leading_zeros();
    bits.div_ceil(7).max(1)
}

fn sleb128_byte_len(v: i128) -> u32 {
    // One sign bit on top of the value bits.
    let bits = if v >= 0 {
        129 - v.leading_zeros()
    } else {
        129 - v.leading_ones()
    };
    bits.div_ceil(7)
}

pub(crate) fn write_value(
    schema: &SchemaType,
    value: &Value,
    policy: TagWidthPolicy,
    writer: &mut Writer,
) -> Result<()> {
    match schema {
        SchemaType::Unit => match value {
            Value::Unit => Ok(()),
            other => Err(Error::ser(format!("expected null for unit, got {}", other.kind()))),
        },
        SchemaType::Bool => match value {
            Value::Bool(v) => {
                writer.put_u8(*v as u8);
                Ok(())
            }
            other => Err(Error::ser(format!("expected a bool, got {}", other.kind()))),
        },
        SchemaType::U8 => {
            writer.put_u8(unsigned_in(value, u8::MAX as u128, "u8")? as u8);
            Ok(())
        }
        SchemaType::U16 => {
            writer.put_u16(unsigned_in(value, u16::MAX as u128, "u16")? as u16);
            Ok(())
        }
        SchemaType::U32 => {
            writer.put_u32(unsigned_in(value, u32::MAX as u128, "u32")? as u32);
            Ok(())
        }
        SchemaType::U64 => {
            writer.put_u64(unsigned_in(value, u64::MAX as u128, "u64")? as u64);
            Ok(())
        }
        SchemaType::U128 => {
            writer.put_u128(unsigned_in(value, u128::MAX, "u128")?);
            Ok(())
        }
        SchemaType::I8 => {
            writer.put_i8(signed_in(value, i8::MIN as i128, i8::MAX as i128, "i8")? as i8);
            Ok(())
        }
        SchemaType::I16 => {
            writer.put_i16(signed_in(value, i16::MIN as i128, i16::MAX as i128, "i16")? as i16);
            Ok(())
        }
        SchemaType::I32 => {
            writer.put_i32(signed_in(value, i32::MIN as i128, i32::MAX as i128, "i32")? as i32);
            Ok(())
        }
        SchemaType::I64 => {
            writer.put_i64(signed_in(value, i64::MIN as i128, i64::MAX as i128, "i64")? as i64);
            Ok(())
        }
        SchemaType::I128 => {
            writer.put_i128(signed_in(value, i128::MIN, i128::MAX, "i128")?);
            Ok(())
        }
        SchemaType::Amount => {
            writer.put_u64(unsigned_in(value, u64::MAX as u128, "amount in micro-units")? as u64);
            Ok(())
        }
        SchemaType::AccountAddress => {
            let bytes = hex_bytes(value, "account address")?;
            if bytes.len() != 32 {
                return Err(Error::ser(format!(
                    "account address must be 32 bytes, got {}",
                    bytes.len()
                )));
            }
            writer.put_bytes(&bytes);
            Ok(())
        }
        SchemaType::ContractAddress => {
            let fields = expect_object(value, "contract address")?;
            for (key, _) in fields {
                if key != "index" && key != "subindex" {
                    return Err(Error::ser(format!("unexpected contract address field '{}'", key)));
                }
            }
            let index = value
                .field("index")
                .ok_or_else(|| Error::ser("contract address is missing 'index'"))?;
            writer.put_u64(unsigned_in(index, u64::MAX as u128, "contract index")? as u64);
            let subindex = match value.field("subindex") {
                Some(v) => unsigned_in(v, u64::MAX as u128, "contract subindex")? as u64,
                None => 0,
            };
            writer.put_u64(subindex);
            Ok(())
        }
        SchemaType::Timestamp => {
            writer.put_u64(timestamp_millis(value)?);
            Ok(())
        }
        SchemaType::Duration => {
            writer.put_u64(duration_millis(value)?);
            Ok(())
        }
        SchemaType::Pair(first, second) => {
            let items = expect_array(value, "pair")?;
            if items.len() != 2 {
                return Err(Error::ser(format!("pair needs exactly 2 items, got {}", items.len())));
            }
            write_value(first, &items[0], policy, writer)?;
            write_value(second, &items[1], policy, writer)
        }
        SchemaType::List(size_len, item) | SchemaType::Set(size_len, item) => {
            let items = expect_array(value, "list")?;
            write_size(*size_len, items.len(), "list", writer)?;
            for element in items {
                write_value(item, element, policy, writer)?;
            }
            Ok(())
        }
        SchemaType::Map(size_len, key, val) => {
            let entries = expect_array(value, "map")?;
            write_size(*size_len, entries.len(), "map", writer)?;
            for entry in entries {
                let pair = expect_array(entry, "map entry")?;
                if pair.len() != 2 {
                    return Err(Error::ser(format!(
                        "map entries are [key, value] pairs, got {} items",
                        pair.len()
                    )));
                }
                write_value(key, &pair[0], policy, writer)?;
                write_value(val, &pair[1], policy, writer)?;
            }
            Ok(())
        }
        SchemaType::Array(size, item) => {
            let items = expect_array(value, "array")?;
            if items.len() != *size as usize {
                return Err(Error::ser(format!(
                    "array needs exactly {} items, got {}",
                    size,
                    items.len()
                )));
            }
            for element in items {
                write_value(item, element, policy, writer)?;
            }
            Ok(())
        }
        SchemaType::Struct(fields) => write_fields(fields, value, policy, writer),
        SchemaType::Enum(variants) => {
            let (name, payload) = enum_input(value)?;
            let index = variants
                .iter()
                .position(|v| v.name == name)
                .ok_or_else(|| Error::ser(format!("unknown enum variant '{}'", name)))?;
            match policy.width_for(variants.len()) {
                TagWidth::U8 => {
                    writer.put_u8(index as u8);
                }
                TagWidth::U16 => {
                    writer.put_u16(index as u16);
                }
                TagWidth::U32 => {
                    writer.put_u32(index as u32);
                }
            }
            write_variant_payload(&variants[index].fields, name, payload, policy, writer)
        }
        SchemaType::TaggedEnum(variants) => {
            let (name, payload) = enum_input(value)?;
            let (wire_tag, variant) = variants
                .iter()
                .find(|(_, v)| v.name == name)
                .ok_or_else(|| Error::ser(format!("unknown enum variant '{}'", name)))?;
            writer.put_u8(*wire_tag);
            write_variant_payload(&variant.fields, name, payload, policy, writer)
        }
        SchemaType::String(size_len) => {
            let text = value
                .as_str()
                .ok_or_else(|| Error::ser(format!("expected a string, got {}", value.kind())))?;
            write_sized_bytes(*size_len, text.as_bytes(), "string", writer)
        }
        SchemaType::ContractName(size_len) => {
            let fields = expect_object(value, "contract name")?;
            if fields.len() != 1 || fields[0].0 != "contract" {
                return Err(Error::ser("contract name must be an object with a single 'contract' field"));
            }
            let name = fields[0]
                .1
                .as_str()
                .ok_or_else(|| Error::ser("contract name must be a string"))?;
            if name.contains('.') {
                return Err(Error::ser(format!("contract name '{}' may not contain '.'", name)));
            }
            let full = format!("init_{}", name);
            write_sized_bytes(*size_len, full.as_bytes(), "contract name", writer)
        }
        SchemaType::ReceiveName(size_len) => {
            let fields = expect_object(value, "receive name")?;
            let contract = value
                .field("contract")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::ser("receive name is missing string field 'contract'"))?;
            let func = value
                .field("func")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::ser("receive name is missing string field 'func'"))?;
            if fields.len() != 2 {
                return Err(Error::ser("receive name must have exactly 'contract' and 'func' fields"));
            }
            if contract.contains('.') {
                return Err(Error::ser(format!("contract name '{}' may not contain '.'", contract)));
            }
            let full = format!("{}.{}", contract, func);
            write_sized_bytes(*size_len, full.as_bytes(), "receive name", writer)
        }
        SchemaType::ULeb128(max_bytes) => {
            let v = unsigned_in(value, u128::MAX, "unsigned leb128")?;
            if uleb128_byte_len(v) > *max_bytes {
                return Err(Error::ser(format!(
                    "{} does not fit in {} leb128 bytes",
                    v, max_bytes
                )));
            }
            writer.put_uleb128(v);
            Ok(())
        }
        SchemaType::ILeb128(max_bytes) => {
            let v = signed_in(value, i128::MIN, i128::MAX, "signed leb128")?;
            if sleb128_byte_len(v) > *max_bytes {
                return Err(Error::ser(format!(
                    "{} does not fit in {} leb128 bytes",
                    v, max_bytes
                )));
            }
            writer.put_sleb128(v);
            Ok(())
        }
        SchemaType::ByteList(size_len) => {
            let bytes = hex_bytes(value, "byte list")?;
            write_sized_bytes(*size_len, &bytes, "byte list", writer)
        }
        SchemaType::ByteArray(size) => {
            let bytes = hex_bytes(value, "byte array")?;
            if bytes.len() != *size as usize {
                return Err(Error::ser(format!(
                    "byte array must be exactly {} bytes, got {}",
                    size,
                    bytes.len()
                )));
            }
            writer.put_bytes(&bytes);
            Ok(())
        }
    }
}

/// An enum value is `{ "VariantName": payload }`, or a bare string for
/// fieldless variants.
fn enum_input(value: &Value) -> Result<(&str, Option<&Value>)> {
    match value {
        Value::String(name) => Ok((name, None)),
        Value::Object(fields) if fields.len() == 1 => Ok((&fields[0].0, Some(&fields[0].1))),
        Value::Object(fields) => Err(Error::ser(format!(
            "enum value must have exactly one variant key, got {}",
            fields.len()
        ))),
        other => Err(Error::ser(format!(
            "expected an enum object or variant name string, got {}",
            other.kind()
        ))),
    }
}

fn write_variant_payload(
    fields: &Fields,
    name: &str,
    payload: Option<&Value>,
    policy: TagWidthPolicy,
    writer: &mut Writer,
) -> Result<()> {
    match payload {
        Some(value) => write_fields(fields, value, policy, writer),
        None => match fields {
            Fields::None => Ok(()),
            _ => Err(Error::ser(format!(
                "variant '{}' has fields; pass {{\"{}\": ...}} instead of a bare string",
                name, name
            ))),
        },
    }
}

pub(crate) fn write_fields(
    fields: &Fields,
    value: &Value,
    policy: TagWidthPolicy,
    writer: &mut Writer,
) -> Result<()> {
    match fields {
        Fields::Named(declared) => {
            let supplied = expect_object(value, "named fields")?;
            for (key, _) in supplied {
                if !declared.iter().any(|(name, _)| name == key) {
                    return Err(Error::ser(format!("unexpected field '{}'", key)));
                }
            }
            if supplied.len() != declared.len() {
                return Err(Error::ser(format!(
                    "expected {} fields, got {}",
                    declared.len(),
                    supplied.len()
                )));
            }
            // Wire order is declaration order, whatever order the object used.
            for (name, field_schema) in declared {
                let field_value = value
                    .field(name)
                    .ok_or_else(|| Error::ser(format!("missing field '{}'", name)))?;
                write_value(field_schema, field_value, policy, writer)?;
            }
            Ok(())
        }
        Fields::Unnamed(declared) => {
            let supplied = expect_array(value, "unnamed fields")?;
            if supplied.len() != declared.len() {
                return Err(Error::ser(format!(
                    "expected {} fields, got {}",
                    declared.len(),
                    supplied.len()
                )));
            }
            for (field_schema, field_value) in declared.iter().zip(supplied) {
                write_value(field_schema, field_value, policy, writer)?;
            }
            Ok(())
        }
        Fields::None => match value {
            Value::Unit => Ok(()),
            Value::Array(items) if items.is_empty() => Ok(()),
            other => Err(Error::ser(format!(
                "fieldless value must be null or [], got {}",
                other.kind()
            ))),
        },
    }
}
