use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Value

/// The scalar payload of a Value or Variable node.
///
/// Formats hand over what they natively hold: token formats keep numbers as
/// numbers, text formats hand over [`Value::String`]. Scalar conversion in
/// the type cache accepts either.
///
/// Serialized untagged, so a `Value` maps one-to-one onto a JSON scalar.
///
/// ```
/// use ar_node::Value;
///
/// assert_eq!(Value::from(12).to_text(), "12");
/// assert!(Value::String(String::new()).is_empty());
/// assert!(!Value::Bool(false).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for null and for empty text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as text; null renders as the empty string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::I64(n) => Cow::Owned(n.to_string()),
            Value::U64(n) => Cow::Owned(n.to_string()),
            Value::F64(n) => Cow::Owned(n.to_string()),
            Value::String(s) => Cow::Borrowed(s),
        }
    }

    /// Short name of the variant, used in messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::I64(_) | Value::U64(_) => "integer",
            Value::F64(_) => "number",
            Value::String(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => write!(f, "\"{s}\""),
            other => f.write_str(&other.to_text()),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident, $as:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value as $as)
                }
            }
        )*
    };
}

impl_from!(I64, i64: i8, i16, i32, i64, isize);
impl_from!(U64, u64: u8, u16, u32, u64, usize);
impl_from!(F64, f64: f32, f64);

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// Tests
