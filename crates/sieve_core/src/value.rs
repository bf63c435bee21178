//! Dynamic value representation.
//!
//! Every input handed to a schema, and every output a schema produces, is a
//! [`Value`]. Coercion and transformation steps replace the value in place.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A value flowing through a validation run.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Big integer value
    BigInt(i128),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Point in time (UTC)
    Date(DateTime<Utc>),
    /// List/array value
    List(Vec<Value>),
    /// Map/object value, ordered by key
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::List(_) => "array",
            Value::Map(_) => "object",
        }
    }

    /// Describes the value the way issues report what was received.
    ///
    /// Strings are quoted, scalars are printed, containers and dates are
    /// named by kind.
    pub fn stringify(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::BigInt(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => format!("\"{s}\""),
            Value::Date(_) => "Date".to_string(),
            Value::List(_) => "Array".to_string(),
            Value::Map(_) => "Object".to_string(),
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float.
    ///
    /// Integers and big integers widen; big integers may lose precision.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::BigInt(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as a date.
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Attempts to get this value as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to get this value as a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Compares two values of compatible kinds.
    ///
    /// Numbers compare across `Int`, `BigInt` and `Float`; strings, dates
    /// and booleans compare with their own kind. Anything else is
    /// incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::BigInt(b)) => Some(i128::from(*a).cmp(b)),
            (Value::BigInt(a), Value::Int(b)) => Some(a.cmp(&i128::from(*b))),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (a, b) => a.as_float()?.partial_cmp(&b.as_float()?),
        }
    }

    /// Converts the value into plain JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::BigInt(i) => serde_json::Value::String(i.to_string()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => {
                serde_json::Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        f.to_string()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // JSON has a single number type; integers past i64 become floats
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Value::BigInt(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_types() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::String("test".into()).type_name(), "string");
        assert_eq!(Value::Int(42).type_name(), "number");
        assert_eq!(Value::Float(3.5).type_name(), "number");
        assert_eq!(Value::BigInt(7).type_name(), "bigint");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(Value::List(vec![]).type_name(), "array");
    }

    #[test]
    fn test_stringify() {
        assert_eq!(Value::from("abc").stringify(), "\"abc\"");
        assert_eq!(Value::Null.stringify(), "null");
        assert_eq!(Value::Float(1.5).stringify(), "1.5");
        assert_eq!(Value::Float(f64::NAN).stringify(), "NaN");
        assert_eq!(Value::Float(2.0).stringify(), "2");
        assert_eq!(Value::List(vec![]).stringify(), "Array");
        assert_eq!(Value::Map(BTreeMap::new()).stringify(), "Object");
        assert_eq!(Value::Date(Utc::now()).stringify(), "Date");
    }

    #[test]
    fn test_compare_across_numeric_kinds() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(Value::BigInt(3).compare(&Value::Int(3)), Some(Ordering::Equal));
        assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::from("1").compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_json_conversion() {
        let value = Value::from(json!({"a": [1, 2.5, "x", null], "b": true}));
        let Value::Map(map) = &value else {
            panic!("expected a map");
        };
        assert_eq!(
            map.get("a"),
            Some(&Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null
            ]))
        );
        assert_eq!(value.to_json(), json!({"a": [1, 2.5, "x", null], "b": true}));
    }

    #[test]
    fn test_large_json_integer_stays_a_number() {
        let value = Value::from(json!(18446744073709551615u64));
        assert_eq!(value, Value::Float(18446744073709551615u64 as f64));
        assert_eq!(value.type_name(), "number");
    }

    #[test]
    fn test_bigint_serializes_as_string() {
        let json = serde_json::to_string(&Value::BigInt(12345678901234567890)).unwrap();
        assert_eq!(json, "\"12345678901234567890\"");
    }
}
