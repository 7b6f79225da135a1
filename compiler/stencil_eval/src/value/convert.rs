//! Conversions: numbers, output text and JSON.

use std::sync::Arc;

use super::{ObjectMap, Value};

/// Doubles print like JavaScript numbers: `6.2`, `3`, `NaN`, `Infinity`.
pub(super) fn format_double(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// Saturating truncation toward zero.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn truncate(n: f64) -> i64 {
    n.trunc() as i64
}

impl Value {
    /// Numeric view: numbers, booleans and numeric strings.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) | Value::Raw(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integer view; doubles truncate toward zero.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Double(n) if n.is_finite() => Some(truncate(*n)),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Str(s) | Value::Raw(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite())
                        .map(truncate)
                })
            }
            _ => None,
        }
    }

    /// A number from a numeric value or string, preferring `Int`.
    pub fn to_number(&self) -> Option<Value> {
        match self {
            Value::Int(_) | Value::Double(_) => Some(self.clone()),
            Value::Bool(b) => Some(Value::Int(i64::from(*b))),
            Value::Str(s) | Value::Raw(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(Value::Int)
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(Value::Double))
            }
            _ => None,
        }
    }

    /// Output text of the value.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// `Arc<str>` of the display text, reusing string storage.
    pub fn to_arc_str(&self) -> Arc<str> {
        match self {
            Value::Str(s) | Value::Raw(s) => Arc::clone(s),
            other => other.to_string().into(),
        }
    }
}

/// Convert to JSON. Functions become `null`; hosts become objects of their
/// named fields.
pub fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Undefined | Value::Null | Value::Function(_) => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::from(*n),
        Value::Double(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Str(s) | Value::Raw(s) => Json::String(s.to_string()),
        Value::List(items) => Json::Array(items.read().iter().map(to_json).collect()),
        Value::Object(map) => Json::Object(
            map.read()
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
        Value::Host(host) => Json::Object(
            host.property_names()
                .into_iter()
                .map(|name| {
                    let field = host.property(&name).unwrap_or_default();
                    (name, to_json(&field))
                })
                .collect(),
        ),
    }
}

/// Convert from JSON, keeping object key order.
pub fn from_json(json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Double))
            .unwrap_or(Value::Null),
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::list(items.iter().map(from_json).collect()),
        Json::Object(map) => Value::object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect::<ObjectMap>(),
        ),
    }
}
