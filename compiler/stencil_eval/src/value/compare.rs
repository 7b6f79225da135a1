//! Equality and ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use super::Value;

/// `===`: same category and equal. `Int` and `Double` are one category.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Int(_) | Value::Double(_), Value::Int(_) | Value::Double(_)) => {
            a.to_f64() == b.to_f64()
        }
        (Value::Str(x) | Value::Raw(x), Value::Str(y) | Value::Raw(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.ptr_eq(y) || {
                let (x, y) = (x.read(), y.read());
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| strict_equals(a, b))
            }
        }
        (Value::Object(x), Value::Object(y)) => {
            x.ptr_eq(y) || {
                let (x, y) = (x.read(), y.read());
                x.len() == y.len()
                    && x.iter()
                        .all(|(k, v)| y.get(k).is_some_and(|w| strict_equals(v, w)))
            }
        }
        (Value::Function(x), Value::Function(y)) => Arc::ptr_eq(x, y),
        (Value::Host(x), Value::Host(y)) => Arc::ptr_eq(x, y),
        _ => false,
    }
}

/// `==`: null equals undefined, and numbers compare with numeric strings
/// and booleans.
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Int(_) | Value::Double(_) | Value::Bool(_), Value::Str(_) | Value::Raw(_))
        | (Value::Str(_) | Value::Raw(_), Value::Int(_) | Value::Double(_) | Value::Bool(_))
        | (Value::Bool(_), Value::Int(_) | Value::Double(_))
        | (Value::Int(_) | Value::Double(_), Value::Bool(_)) => match (a.to_f64(), b.to_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => strict_equals(a, b),
    }
}

/// Ordering for `<`, `orderBy` and `min`/`max`. `None` when the values do
/// not compare (e.g. a list against a number).
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Str(x) | Value::Raw(x), Value::Str(y) | Value::Raw(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Some(Ordering::Equal),
        (Value::Undefined | Value::Null, _) => Some(Ordering::Less),
        (_, Value::Undefined | Value::Null) => Some(Ordering::Greater),
        _ => a.to_f64()?.partial_cmp(&b.to_f64()?),
    }
}
