//! Binary and unary operators.
//!
//! Arithmetic follows JavaScript: `+` concatenates when either side is a
//! string, integer results stay integers while they are exact and fit,
//! and division by zero yields an infinity or NaN rather than an error.

use stencil_ir::{BinaryOp, UnaryOp};

use crate::errors::EvalResult;
use crate::value::{compare_values, loose_equals, strict_equals, truncate};
use crate::Value;

#[derive(Copy, Clone, Debug)]
enum Num {
    Int(i64),
    Double(f64),
}

impl Num {
    fn of(value: &Value) -> Num {
        match value {
            Value::Int(n) => Num::Int(*n),
            Value::Double(n) => Num::Double(*n),
            Value::Bool(b) => Num::Int(i64::from(*b)),
            Value::Null => Num::Int(0),
            Value::Str(_) | Value::Raw(_) => match value.to_number() {
                Some(Value::Int(n)) => Num::Int(n),
                Some(Value::Double(n)) => Num::Double(n),
                _ => Num::Double(f64::NAN),
            },
            _ => Num::Double(f64::NAN),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Double(n) => n,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Num::Int(n) => n,
            Num::Double(n) if n.is_finite() => truncate(n),
            Num::Double(_) => 0,
        }
    }
}

fn arith(
    left: Num,
    right: Num,
    int_op: fn(i64, i64) -> Option<i64>,
    double_op: fn(f64, f64) -> f64,
) -> Value {
    match (left, right) {
        (Num::Int(l), Num::Int(r)) => int_op(l, r).map_or_else(
            || Value::Double(double_op(left.as_f64(), right.as_f64())),
            Value::Int,
        ),
        _ => Value::Double(double_op(left.as_f64(), right.as_f64())),
    }
}

fn divide(left: Num, right: Num) -> Value {
    if let (Num::Int(l), Num::Int(r)) = (left, right) {
        if r != 0 && l.checked_rem(r) == Some(0) {
            if let Some(q) = l.checked_div(r) {
                return Value::Int(q);
            }
        }
    }
    Value::Double(left.as_f64() / right.as_f64())
}

fn remainder(left: Num, right: Num) -> Value {
    match (left, right) {
        (Num::Int(l), Num::Int(r)) if r != 0 => {
            l.checked_rem(r).map_or(Value::Int(0), Value::Int)
        }
        _ => Value::Double(left.as_f64() % right.as_f64()),
    }
}

fn compare(left: &Value, right: &Value, accept: fn(std::cmp::Ordering) -> bool) -> Value {
    Value::Bool(compare_values(left, right).is_some_and(accept))
}

pub(crate) fn binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let value = match op {
        BinaryOp::Add if left.as_str().is_some() || right.as_str().is_some() => {
            let mut text = left.to_display_string();
            text.push_str(&right.to_display_string());
            Value::from(text)
        }
        BinaryOp::Add => arith(Num::of(left), Num::of(right), i64::checked_add, |l, r| l + r),
        BinaryOp::Sub => arith(Num::of(left), Num::of(right), i64::checked_sub, |l, r| l - r),
        BinaryOp::Mul => arith(Num::of(left), Num::of(right), i64::checked_mul, |l, r| l * r),
        BinaryOp::Div => divide(Num::of(left), Num::of(right)),
        BinaryOp::Mod => remainder(Num::of(left), Num::of(right)),

        BinaryOp::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNotEq => Value::Bool(!strict_equals(left, right)),

        BinaryOp::Lt => compare(left, right, std::cmp::Ordering::is_lt),
        BinaryOp::LtEq => compare(left, right, std::cmp::Ordering::is_le),
        BinaryOp::Gt => compare(left, right, std::cmp::Ordering::is_gt),
        BinaryOp::GtEq => compare(left, right, std::cmp::Ordering::is_ge),

        BinaryOp::BitAnd => Value::Int(Num::of(left).as_i64() & Num::of(right).as_i64()),
        BinaryOp::BitOr => Value::Int(Num::of(left).as_i64() | Num::of(right).as_i64()),
        BinaryOp::BitXor => Value::Int(Num::of(left).as_i64() ^ Num::of(right).as_i64()),
        BinaryOp::Shl => Value::Int(Num::of(left).as_i64().wrapping_shl(shift(right, 63))),
        BinaryOp::Shr => Value::Int(Num::of(left).as_i64().wrapping_shr(shift(right, 63))),
        BinaryOp::UnsignedShr => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bits = Num::of(left).as_i64() as u32;
            Value::Int(i64::from(bits >> shift(right, 31)))
        }
    };
    Ok(value)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shift(amount: &Value, mask: i64) -> u32 {
    (Num::of(amount).as_i64() & mask) as u32
}

pub(crate) fn unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Bool(operand.is_falsy()),
        UnaryOp::Neg => match Num::of(operand) {
            Num::Int(n) => n
                .checked_neg()
                .map_or_else(|| Value::Double(-Num::Int(n).as_f64()), Value::Int),
            Num::Double(n) => Value::Double(-n),
        },
        UnaryOp::Plus => match Num::of(operand) {
            Num::Int(n) => Value::Int(n),
            Num::Double(n) => Value::Double(n),
        },
        UnaryOp::BitNot => Value::Int(!Num::of(operand).as_i64()),
    }
}
