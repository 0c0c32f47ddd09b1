//! Literal constant values.

use std::fmt;

/// A literal value carried by a constant expression or a compiled
/// final-static field initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConstantValue {
    /// Whether the value is `null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, ConstantValue::Null)
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Bool(b) => write!(f, "{b}"),
            ConstantValue::Int(i) => write!(f, "{i}"),
            ConstantValue::Float(v) => write!(f, "{v}"),
            ConstantValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for ConstantValue {
    fn from(v: bool) -> Self {
        ConstantValue::Bool(v)
    }
}

impl From<i64> for ConstantValue {
    fn from(v: i64) -> Self {
        ConstantValue::Int(v)
    }
}

impl From<f64> for ConstantValue {
    fn from(v: f64) -> Self {
        ConstantValue::Float(v)
    }
}

impl From<&str> for ConstantValue {
    fn from(v: &str) -> Self {
        ConstantValue::Str(v.to_string())
    }
}

impl From<String> for ConstantValue {
    fn from(v: String) -> Self {
        ConstantValue::Str(v)
    }
}
