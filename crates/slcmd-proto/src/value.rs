//! Argument and result values.

use std::fmt;

use crate::flags::ArgType;

/// A decoded argument or callback result.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// String.
    String(String),
}

impl Value {
    /// Declared type of the value, `None` for [`Value::Null`].
    pub fn arg_type(&self) -> Option<ArgType> {
        match self {
            Self::Null => None,
            Self::Integer(_) => Some(ArgType::Integer),
            Self::Float(_) => Some(ArgType::Float),
            Self::Boolean(_) => Some(ArgType::Boolean),
            Self::String(_) => Some(ArgType::String),
        }
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.arg_type().map_or("null", ArgType::as_str)
    }

    /// Null, `false`, and numeric zero are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Integer(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Boolean(b) => *b,
            Self::String(_) => true,
        }
    }

    /// Numeric view of the value. Floats are truncated, booleans map to 0/1.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(f) => Some(*f as i64),
            Self::Boolean(b) => Some(i64::from(*b)),
            Self::Null | Self::String(_) => None,
        }
    }

    /// Floating point view of the value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// String slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
        assert!(Value::from("").is_truthy());
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Value::Float(2.9).as_integer(), Some(2));
        assert_eq!(Value::Boolean(true).as_integer(), Some(1));
        assert_eq!(Value::from("7").as_integer(), None);
        assert_eq!(Value::Null.as_integer(), None);
    }

    #[test]
    fn test_arg_type() {
        assert_eq!(Value::Integer(1).arg_type(), Some(ArgType::Integer));
        assert_eq!(Value::from("x").arg_type(), Some(ArgType::String));
        assert_eq!(Value::Null.arg_type(), None);
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Boolean(true));
    }
}
