//! Normalized similarity between two values.
//!
//! Scores lie in `[0, 1]`; `1.0` means structurally equal. The array aligner
//! uses these scores to decide which old element became which new element.
//!
//! # Examples
//!
//! ```
//! use jdiff::similarity::similarity;
//! use jdiff::Value;
//!
//! let score = similarity(&Value::from("hello"), &Value::from("hallo"));
//! assert!((score - 0.8).abs() < 1e-9);
//! ```

use crate::value::Value;

/// Levenshtein distance between two strings, counted in chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Similarity of two strings: `1 - distance / max_len`.
#[must_use]
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// Similarity of two numbers: `1 - |a - b| / (2 * max(|a|, |b|))`.
#[must_use]
pub fn number_similarity(a: f64, b: f64) -> f64 {
    if a == b {
        return 1.0;
    }
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        return 1.0;
    }
    (1.0 - (a - b).abs() / (2.0 * scale)).clamp(0.0, 1.0)
}

/// Computes how alike two values are.
///
/// Null only resembles null; mismatched types score zero. Containers are
/// scored element-wise (arrays, by index) or key-wise (objects, shared keys),
/// and then scaled down by how much of the larger side was actually paired.
#[must_use]
pub fn similarity(a: &Value, b: &Value) -> f64 {
    match (a, b) {
        (Value::Null, Value::Null) => 1.0,
        (Value::Null, _) | (_, Value::Null) => 0.0,
        (Value::String(x), Value::String(y)) => string_similarity(x, y),
        (Value::Number(x), Value::Number(y)) => number_similarity(*x, *y),
        (Value::Bool(x), Value::Bool(y)) => {
            if x == y {
                1.0
            } else {
                0.0
            }
        }
        (Value::Array(x), Value::Array(y)) => array_similarity(x, y),
        (Value::Object(x), Value::Object(y)) => {
            if x.is_empty() && y.is_empty() {
                return 1.0;
            }
            if x.is_empty() || y.is_empty() {
                return 0.0;
            }
            let union = x.len() + y.keys().filter(|k| !x.contains_key(*k)).count();
            let mut shared = 0usize;
            let mut total = 0.0;
            for (key, left) in x {
                if let Some(right) = y.get(key) {
                    shared += 1;
                    total += similarity(left, right);
                }
            }
            (total / union as f64) * (shared as f64 / union as f64)
        }
        _ => {
            if a.deep_equals(b) {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn array_similarity(x: &[Value], y: &[Value]) -> f64 {
    if x.is_empty() && y.is_empty() {
        return 1.0;
    }
    if x.is_empty() || y.is_empty() {
        return 0.0;
    }
    let min_len = x.len().min(y.len());
    let max_len = x.len().max(y.len());
    let total: f64 = x.iter().zip(y).map(|(l, r)| similarity(l, r)).sum();
    (total / max_len as f64) * (min_len as f64 / max_len as f64)
}
