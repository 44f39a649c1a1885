//! Literal values carried by comparison filters

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag of a [`Value`], used in diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
    Null,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Null => "null",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal value in a filter expression
///
/// Display produces the DSL source form: strings are double-quoted, null
/// renders as `null`, and floats always keep a decimal point (`1.0`, never
/// `1`) so printed filters re-parse to the same tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::Null => ValueType::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric form; ints are widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text form without string quoting, as used by phrase matches and
    /// LIKE patterns
    pub fn text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Bool(v) => write!(f, "{}", v),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(Value::from("man alive").to_string(), "\"man alive\"");
    }

    #[test]
    fn test_display_null() {
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(-7).to_string(), "-7");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_integral_float_keeps_decimal_point() {
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from(-2.0).to_string(), "-2.0");
    }

    #[test]
    fn test_text_strips_quoting_only() {
        assert_eq!(Value::from("bar").text(), "bar");
        assert_eq!(Value::from(1).text(), "1");
        assert_eq!(Value::from(true).text(), "true");
        assert_eq!(Value::Null.text(), "null");
    }

    #[test]
    fn test_value_types() {
        assert_eq!(Value::from("s").value_type(), ValueType::String);
        assert_eq!(Value::from(1).value_type(), ValueType::Int);
        assert_eq!(Value::from(1.0).value_type(), ValueType::Float);
        assert_eq!(Value::from(false).value_type(), ValueType::Bool);
        assert_eq!(Value::Null.value_type(), ValueType::Null);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_as_f64_widens_ints() {
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::from("3").as_f64(), None);
    }

    #[test]
    fn test_serialize_untagged() {
        assert_eq!(serde_json::to_string(&Value::from("a")).unwrap(), "\"a\"");
        assert_eq!(serde_json::to_string(&Value::from(1)).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }
}
