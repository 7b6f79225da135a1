//! Arithmetic. Operands follow the `+ - * / %` operator rules.

use stencil_ir::{BinaryOp, UnaryOp};

use super::{number, with_aliases};
use crate::errors::EvalResult;
use crate::filters::FilterDef;
use crate::interpreter::{binary, unary};
use crate::value::{compare_values, truncate};
use crate::Value;

pub(super) fn filters() -> Vec<FilterDef> {
    let mut defs = vec![
        operator("add", BinaryOp::Add),
        operator("mod", BinaryOp::Mod),
        FilterDef::any("incr", 1, |args| binary(BinaryOp::Add, &args[0], &Value::Int(1))),
        FilterDef::any("decr", 1, |args| binary(BinaryOp::Sub, &args[0], &Value::Int(1))),
        FilterDef::any("negate", 1, |args| Ok(unary(UnaryOp::Neg, &number("negate", &args[0])?))),
        FilterDef::any("abs", 1, |args| abs(&number("abs", &args[0])?)),
        FilterDef::any("min", 2, |args| Ok(pick(&args[0], &args[1], true))),
        FilterDef::any("max", 2, |args| Ok(pick(&args[0], &args[1], false))),
        FilterDef::any("round", 1, |args| round("round", &args[0], 0, f64::round)),
        FilterDef::any("round", 2, |args| {
            let digits = number("round", &args[1])?.to_i64().unwrap_or(0);
            round("round", &args[0], digits, f64::round)
        }),
        FilterDef::any("floor", 1, |args| round("floor", &args[0], 0, f64::floor)),
        FilterDef::any("ceiling", 1, |args| round("ceiling", &args[0], 0, f64::ceil)),
    ];
    defs.extend(with_aliases(operator("subtract", BinaryOp::Sub), &["sub"]));
    defs.extend(with_aliases(operator("multiply", BinaryOp::Mul), &["mul"]));
    defs.extend(with_aliases(operator("divide", BinaryOp::Div), &["div"]));
    defs
}

fn operator(name: &'static str, op: BinaryOp) -> FilterDef {
    FilterDef::any(name, 2, move |args| {
        let left = number(name, &args[0])?;
        let right = number(name, &args[1])?;
        binary(op, &left, &right)
    })
}

fn abs(value: &Value) -> EvalResult {
    Ok(match value {
        Value::Int(n) => n
            .checked_abs()
            .map_or_else(|| Value::Double(value.to_f64().unwrap_or(0.0).abs()), Value::Int),
        other => Value::Double(other.to_f64().unwrap_or(f64::NAN).abs()),
    })
}

fn pick(a: &Value, b: &Value, smaller: bool) -> Value {
    match compare_values(a, b) {
        Some(ordering) if ordering.is_gt() == smaller => b.clone(),
        _ => a.clone(),
    }
}

/// Round to `digits` decimals with `f`. Integers pass through; whole results
/// that fit come back as integers.
fn round(filter: &str, value: &Value, digits: i64, f: fn(f64) -> f64) -> EvalResult {
    let n = match number(filter, value)? {
        Value::Int(n) => return Ok(Value::Int(n)),
        other => other.to_f64().unwrap_or(f64::NAN),
    };
    if digits > 0 {
        let scale = 10f64.powi(i32::try_from(digits.min(15)).unwrap_or(15));
        return Ok(Value::Double(f(n * scale) / scale));
    }
    let rounded = f(n);
    if rounded.is_finite() && rounded.abs() < 9.0e15 {
        Ok(Value::Int(truncate(rounded)))
    } else {
        Ok(Value::Double(rounded))
    }
}
