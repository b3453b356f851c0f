//! The value model shared by every stage of the diff.
//!
//! A [`Value`] is what a parsed JSON, YAML or TOML document becomes. Key absence
//! is not a variant: the comparator models a missing side as `None`, which keeps
//! "key missing" and "key set to null" apart everywhere.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// A node of structured data.
///
/// Object keys keep their document order so rendered output is stable, but
/// equality and similarity never look at that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns true for arrays and objects.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Deep, order-sensitive (for arrays), type-sensitive structural equality.
    ///
    /// Object key order is ignored; numbers compare exactly, so `1` and `1.0`
    /// are equal but `0.1 + 0.2` and `0.3` are not.
    pub fn deep_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_equals(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|v| value.deep_equals(v)))
            }
            _ => false,
        }
    }

    /// Returns a copy with every object entry named in `keys` removed, at any depth.
    pub fn without_keys(&self, keys: &HashSet<String>) -> Value {
        match self {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(key, _)| !keys.contains(*key))
                    .map(|(key, item)| (key.clone(), item.without_keys(keys)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|item| item.without_keys(keys)).collect()),
            other => other.clone(),
        }
    }

    /// Textual form of a primitive, as it appears in rendered output.
    ///
    /// Containers fall back to a compact count preview; the formatter renders
    /// them as indented blocks instead.
    pub fn scalar_text(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => quote(s),
            Value::Array(arr) if arr.is_empty() => "[]".to_string(),
            Value::Array(arr) => format!("[ {} ]", plural(arr.len(), "item")),
            Value::Object(map) if map.is_empty() => "{}".to_string(),
            Value::Object(map) => format!("{{ {} }}", plural(map.len(), "key")),
        }
    }
}

/// Equality over possibly-absent values. Absent only equals absent.
pub fn is_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.deep_equals(b),
        _ => false,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub(crate) fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
