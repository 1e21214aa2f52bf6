//! Scalar value types shared by the decoders.
//!
//! - [`Value`] is a decoded, schema-typed scalar.
//! - [`RawValue`] is what the structured format hands over before coercion:
//!   a closed set of native kinds, including lists, so a list arriving at a
//!   scalar field is a detectable conversion failure.
//! - [`Cell`] distinguishes a stored value from an absent one.

use std::fmt;

use serde::Serialize;

use crate::schema::FieldType;

/// A decoded scalar of one of the four schema field types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Integer(_) => FieldType::Integer,
            Value::Float(_) => FieldType::Float,
            Value::Text(_) => FieldType::Text,
            Value::Boolean(_) => FieldType::Boolean,
        }
    }

    /// Numeric view used for range checks. Text and Boolean have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Boolean(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            // Debug keeps the decimal point on whole floats ("5.0", not "5")
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// A dynamically typed value as found in the structured format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    List(Vec<RawValue>),
}

impl RawValue {
    /// Native kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
            RawValue::Boolean(_) => "boolean",
            RawValue::List(_) => "list",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(i) => write!(f, "{}", i),
            RawValue::Float(x) => write!(f, "{:?}", x),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Boolean(b) => write!(f, "{}", b),
            RawValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Integer(i) => RawValue::Integer(i),
            Value::Float(x) => RawValue::Float(x),
            Value::Text(s) => RawValue::Text(s),
            Value::Boolean(b) => RawValue::Boolean(b),
        }
    }
}

/// One stored cell of a column: a concrete value or the missing marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Present(Value),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Cell::Present(v) => Some(v),
            Cell::Missing => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Cell::Present(v) => Some(v),
            Cell::Missing => None,
        }
    }
}

impl From<Option<Value>> for Cell {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Cell::Missing, Cell::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_display_keeps_decimal_point() {
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::Float(0.06).to_string(), "0.06");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
    }

    #[test]
    fn numeric_view() {
        assert_eq!(Value::Integer(4).as_f64(), Some(4.0));
        assert_eq!(Value::Text("4".into()).as_f64(), None);
        assert_eq!(Value::Boolean(true).as_f64(), None);
    }

    #[test]
    fn raw_list_display_and_kind() {
        let raw = RawValue::List(vec![RawValue::Integer(1), RawValue::Text("a".into())]);
        assert_eq!(raw.to_string(), "[1, a]");
        assert_eq!(raw.kind(), "list");
    }

    #[test]
    fn cell_from_option() {
        assert_eq!(Cell::from(None), Cell::Missing);
        assert_eq!(
            Cell::from(Some(Value::Boolean(true))).value(),
            Some(&Value::Boolean(true))
        );
    }

    #[test]
    fn untagged_serialization() {
        let json = serde_json::to_string(&vec![
            Cell::Present(Value::Float(1.5)),
            Cell::Missing,
            Cell::Present(Value::Text("GENROU".into())),
        ])
        .unwrap();
        assert_eq!(json, r#"[1.5,null,"GENROU"]"#);
    }
}
