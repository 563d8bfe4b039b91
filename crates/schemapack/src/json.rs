//! JSON interop for the value model.
//!
//! JSON numbers only travel losslessly up to 64 bits, so integers beyond
//! `u64`/`i64` become decimal strings on the way out, and decimal strings
//! are accepted anywhere a number is expected on the way in (the codec
//! itself parses numeric strings at numeric schema positions). Floats are
//! rejected outright: no schema shape is floating-point.

use crate::types::Error;
use crate::types::Result;
use crate::value::Number;
use crate::value::Value;

/// Converts a decoded value into JSON.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Unit => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Number(Number::Unsigned(v)) => match u64::try_from(*v) {
            Ok(small) => serde_json::Value::from(small),
            Err(_) => serde_json::Value::from(v.to_string()),
        },
        Value::Number(Number::Signed(v)) => match i64::try_from(*v) {
            Ok(small) => serde_json::Value::from(small),
            Err(_) => serde_json::Value::from(v.to_string()),
        },
        Value::String(s) => serde_json::Value::from(s.as_str()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(fields) => serde_json::Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

/// Converts caller-supplied JSON into a value tree ready for encoding.
pub fn from_json(json: &serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Unit),
        serde_json::Value::Bool(v) => Ok(Value::Bool(*v)),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(Value::Number(Number::Unsigned(v as u128)))
            } else if let Some(v) = n.as_i64() {
                Ok(Value::Number(Number::Signed(v as i128)))
            } else {
                Err(Error::ser(format!(
                    "non-integer number {}: pass large or fractional values as strings",
                    n
                )))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => {
            let converted: Result<Vec<Value>> = items.iter().map(from_json).collect();
            Ok(Value::Array(converted?))
        }
        serde_json::Value::Object(fields) => {
            let mut converted = Vec::with_capacity(fields.len());
            for (k, v) in fields {
                converted.push((k.clone(), from_json(v)?));
            }
            Ok(Value::Object(converted))
        }
    }
}
