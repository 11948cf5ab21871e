//! Value helpers for the JSON value model.
//!
//! The engine operates directly on [`serde_json::Value`]. This module adds
//! the two operations matching needs beyond what `serde_json` provides:
//!
//! - [`kind`] — stable kind names for diagnostics ("expected type object
//!   but received array")
//! - [`value_eq`] — deep equality with *numeric* number comparison, so
//!   `1`, `1.0` and `1e0` are equal even though their `Number`
//!   representations differ

use serde_json::Value;

/// The kind of a value, as it appears in failure messages.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// assert_eq!(sift::value::kind(&json!({})), "object");
/// assert_eq!(sift::value::kind(&json!([1, 2])), "array");
/// assert_eq!(sift::value::kind(&json!(null)), "null");
/// ```
#[must_use]
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deep equality over values, comparing numbers by numeric value.
///
/// `serde_json::Value`'s own `PartialEq` distinguishes integer and float
/// representations (`1 != 1.0`). Matching must not: a template author
/// writing `60` expects it to match a target that serialized `60.0`.
#[must_use]
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| value_eq(p, q))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| value_eq(v, w)))
        }
        _ => a == b,
    }
}

fn number_eq(x: &serde_json::Number, y: &serde_json::Number) -> bool {
    // Compare in the widest lossless representation available before
    // falling back to f64 (which would conflate distinct huge integers).
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
