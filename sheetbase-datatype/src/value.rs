use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Scalar value stored in catalog rows, column defaults, type options
/// and filter parameters.
///
/// Floats compare and hash by their bit pattern, so a value can be used
/// as key of unique checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value kind, used in error messages.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl PartialEq for Value {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => (),
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(src: bool) -> Self {
        Value::Bool(src)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(src: i32) -> Self {
        Value::Int(src as i64)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(src: i64) -> Self {
        Value::Int(src)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(src: f64) -> Self {
        Value::Float(src)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(src: &str) -> Self {
        Value::Text(src.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(src: String) -> Self {
        Value::Text(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(src: Option<T>) -> Self {
        src.map(Into::into).unwrap_or_default()
    }
}
