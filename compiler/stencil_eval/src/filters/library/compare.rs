//! Equality, ordering and predicates.

use stencil_ir::BinaryOp;

use crate::filters::FilterDef;
use crate::interpreter::binary;
use crate::value::loose_equals;
use crate::Value;

pub(super) fn filters() -> Vec<FilterDef> {
    vec![
        FilterDef::any("eq", 2, |args| Ok(Value::Bool(loose_equals(&args[0], &args[1])))),
        FilterDef::any("not", 1, |args| Ok(Value::Bool(args[0].is_falsy()))),
        FilterDef::any("not", 2, |args| Ok(Value::Bool(!loose_equals(&args[0], &args[1])))),
        ordering("gt", BinaryOp::Gt),
        ordering("gte", BinaryOp::GtEq),
        ordering("lt", BinaryOp::Lt),
        ordering("lte", BinaryOp::LtEq),
        FilterDef::any("isEven", 1, |args| Ok(Value::Bool(parity(&args[0]) == Some(0)))),
        FilterDef::any("isOdd", 1, |args| Ok(Value::Bool(parity(&args[0]) == Some(1)))),
        FilterDef::any("isNull", 1, |args| Ok(Value::Bool(args[0].is_nullish()))),
        FilterDef::any("isEmpty", 1, |args| Ok(Value::Bool(args[0].is_empty()))),
    ]
}

fn ordering(name: &str, op: BinaryOp) -> FilterDef {
    FilterDef::any(name, 2, move |args| binary(op, &args[0], &args[1]))
}

fn parity(value: &Value) -> Option<i64> {
    value.to_i64().map(|n| n.rem_euclid(2))
}
