//! The application-level value model: the dynamically-typed tree that the
//! codec encodes from and decodes into.
//!
//! Values mirror JSON shapes but carry integers in 128-bit variants so that
//! u64/u128/i128 wire widths survive the trip losslessly. Objects are
//! order-preserving vectors of pairs, which keeps decode output
//! deterministic.

/// An integer of up to 128 bits, signed or unsigned.
///
/// Equality is value-based across the two representations:
/// `Unsigned(5) == Signed(5)`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Unsigned(u128),
    Signed(i128),
}

impl Number {
    pub fn as_u128(self) -> Option<u128> {
        match self {
            Number::Unsigned(v) => Some(v),
            Number::Signed(v) if v >= 0 => Some(v as u128),
            Number::Signed(_) => None,
        }
    }

    pub fn as_i128(self) -> Option<i128> {
        match self {
            Number::Signed(v) => Some(v),
            Number::Unsigned(v) if v <= i128::MAX as u128 => Some(v as i128),
            Number::Unsigned(_) => None,
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        self.as_u128().and_then(|v| u64::try_from(v).ok())
    }

    pub fn as_i64(self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Unsigned(a), Number::Unsigned(b)) => a == b,
            (Number::Signed(a), Number::Signed(b)) => a == b,
            (Number::Unsigned(a), Number::Signed(b)) | (Number::Signed(b), Number::Unsigned(a)) => {
                *b >= 0 && *a == *b as u128
            }
        }
    }
}

impl Eq for Number {}

macro_rules! number_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Number {
            fn from(v: $ty) -> Self { Number::Unsigned(v as u128) }
        })*
    };
}

macro_rules! number_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Number {
            fn from(v: $ty) -> Self { Number::Signed(v as i128) }
        })*
    };
}

number_from_unsigned!(u8, u16, u32, u64, u128);
number_from_signed!(i8, i16, i32, i64, i128);

/// A dynamically-typed value tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Unit,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn number(v: impl Into<Number>) -> Self {
        Value::Number(v.into())
    }

    pub fn string(v: impl Into<String>) -> Self {
        Value::String(v.into())
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Looks a field up by name in an object value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// What kind of value this is, for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Value::Number(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}
