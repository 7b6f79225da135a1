//! Collection filters.
//!
//! Collections are anything the capability table can enumerate: lists,
//! objects (as `{ key, value }` entries), strings and enumerable host
//! values. `null` and `undefined` read as empty.
//!
//! Per-item arguments are either arrow functions (`map(x => x * 2)`) or
//! expression text evaluated with `it` and `index` bound
//! (`where: it.age > 18`).

use std::cmp::Ordering;

use stencil_ir::BinaryOp;

use super::{count, not_supported, with_aliases};
use crate::errors::EvalResult;
use crate::filters::{FilterCx, FilterDef, FilterFlags, ParamShape};
use crate::interpreter::binary;
use crate::pending::Outcome;
use crate::value::{compare_values, strict_equals, ObjectMap};
use crate::Value;

pub(super) fn filters() -> Vec<FilterDef> {
    let mut defs = vec![
        FilterDef::new("sum", &[ParamShape::Any], |cx, args| {
            let items = items_of(cx, &args[0])?;
            sum(&items).map(Outcome::Value)
        }),
        FilterDef::new("sum", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            let items = project(cx, &args[0], &args[1])?;
            sum(&items).map(Outcome::Value)
        }),
        FilterDef::new("first", &[ParamShape::Any], |cx, args| {
            Ok(items_of(cx, &args[0])?.into_iter().next().unwrap_or(Value::Null).into())
        }),
        FilterDef::new("last", &[ParamShape::Any], |cx, args| {
            Ok(items_of(cx, &args[0])?.pop().unwrap_or(Value::Null).into())
        }),
        FilterDef::new("take", &[ParamShape::Any, ParamShape::Int], |cx, args| {
            let n = count(cx.name(), &args[1])?;
            let mut items = items_of(cx, &args[0])?;
            items.truncate(n);
            Ok(Value::list(items).into())
        }),
        FilterDef::new("skip", &[ParamShape::Any, ParamShape::Int], |cx, args| {
            let n = count(cx.name(), &args[1])?;
            let items = items_of(cx, &args[0])?;
            Ok(Value::list(items.into_iter().skip(n).collect()).into())
        }),
        FilterDef::new("reverse", &[ParamShape::Any], |cx, args| {
            if let Value::Str(s) = &args[0] {
                return Ok(Value::from(s.chars().rev().collect::<String>()).into());
            }
            let mut items = items_of(cx, &args[0])?;
            items.reverse();
            Ok(Value::list(items).into())
        }),
        FilterDef::new("join", &[ParamShape::Any], |cx, args| {
            join(cx, &args[0], ",").map(Outcome::Value)
        }),
        FilterDef::new("join", &[ParamShape::Any, ParamShape::Str], |cx, args| {
            join(cx, &args[0], &args[1].to_display_string()).map(Outcome::Value)
        }),
        FilterDef::new("where", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            let items = items_of(cx, &args[0])?;
            let mut kept = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                if cx.apply(&args[1], &item, index)?.is_truthy() {
                    kept.push(item);
                }
            }
            Ok(Value::list(kept).into())
        }),
        FilterDef::new("orderBy", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            order_by(cx, &args[0], &args[1], false).map(Outcome::Value)
        }),
        FilterDef::new("orderByDescending", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            order_by(cx, &args[0], &args[1], true).map(Outcome::Value)
        }),
        FilterDef::new("map", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            Ok(Value::list(project(cx, &args[0], &args[1])?).into())
        }),
        FilterDef::new("forEach", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            project(cx, &args[0], &args[1])?;
            Ok(Outcome::IGNORE)
        })
        .flags(FilterFlags::NO_OUTPUT),
        FilterDef::new("toList", &[ParamShape::Any], |cx, args| {
            Ok(Value::list(items_of(cx, &args[0])?).into())
        }),
        FilterDef::new("keys", &[ParamShape::Any], |cx, args| {
            let keys = cx
                .own_properties(&args[0])
                .into_iter()
                .map(|(key, _)| Value::from(key))
                .collect();
            Ok(Value::list(keys).into())
        }),
        FilterDef::new("values", &[ParamShape::Any], |cx, args| {
            let values = cx
                .own_properties(&args[0])
                .into_iter()
                .map(|(_, value)| value)
                .collect();
            Ok(Value::list(values).into())
        }),
        FilterDef::new("merge", &[ParamShape::Any], |cx, args| {
            let mut merged = ObjectMap::new();
            for source in args {
                merged.extend(cx.own_properties(source));
            }
            Ok(Value::object(merged).into())
        })
        .variadic(),
        FilterDef::new("withKeys", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            select_keys(cx, &args[0], &args[1], true).map(Outcome::Value)
        }),
        FilterDef::new("withoutKeys", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            select_keys(cx, &args[0], &args[1], false).map(Outcome::Value)
        }),
        FilterDef::value("range", &[ParamShape::Int], |args| {
            let n = count("range", &args[0])?;
            Ok(range(0, n))
        }),
        FilterDef::value("range", &[ParamShape::Int, ParamShape::Int], |args| {
            let start = args[0].to_i64().unwrap_or(0);
            let n = count("range", &args[1])?;
            Ok(range(start, n))
        }),
        FilterDef::value("times", &[ParamShape::Int], |args| {
            let n = count("times", &args[0])?;
            Ok(range(0, n))
        }),
        FilterDef::new("flatten", &[ParamShape::Any], |cx, args| {
            let mut flat = Vec::new();
            flatten_into(&items_of(cx, &args[0])?, &mut flat);
            Ok(Value::list(flat).into())
        }),
        FilterDef::new("distinct", &[ParamShape::Any], |cx, args| {
            let mut unique: Vec<Value> = Vec::new();
            for item in items_of(cx, &args[0])? {
                if !unique.iter().any(|seen| strict_equals(seen, &item)) {
                    unique.push(item);
                }
            }
            Ok(Value::list(unique).into())
        }),
        FilterDef::new("any", &[ParamShape::Any], |cx, args| {
            Ok(Value::Bool(!items_of(cx, &args[0])?.is_empty()).into())
        }),
        FilterDef::new("any", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            let items = items_of(cx, &args[0])?;
            for (index, item) in items.iter().enumerate() {
                if cx.apply(&args[1], item, index)?.is_truthy() {
                    return Ok(Value::Bool(true).into());
                }
            }
            Ok(Value::Bool(false).into())
        }),
        FilterDef::new("all", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            let items = items_of(cx, &args[0])?;
            for (index, item) in items.iter().enumerate() {
                if !cx.apply(&args[1], item, index)?.is_truthy() {
                    return Ok(Value::Bool(false).into());
                }
            }
            Ok(Value::Bool(true).into())
        }),
    ];
    defs.extend(with_aliases(
        FilterDef::new("length", &[ParamShape::Any], |cx, args| length(cx, &args[0])),
        &["count"],
    ));
    defs
}

/// Items of a collection argument; `null` and `undefined` are empty.
pub(super) fn items_of(cx: &FilterCx<'_>, value: &Value) -> EvalResult<Vec<Value>> {
    if value.is_nullish() {
        return Ok(Vec::new());
    }
    cx.items(value)
}

fn project(cx: &mut FilterCx<'_>, source: &Value, func: &Value) -> EvalResult<Vec<Value>> {
    let items = items_of(cx, source)?;
    let mut mapped = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        mapped.push(cx.apply(func, item, index)?);
    }
    Ok(mapped)
}

fn sum(items: &[Value]) -> EvalResult {
    items
        .iter()
        .try_fold(Value::Int(0), |total, item| binary(BinaryOp::Add, &total, item))
}

fn join(cx: &FilterCx<'_>, source: &Value, separator: &str) -> EvalResult {
    let parts: Vec<String> = items_of(cx, source)?
        .iter()
        .map(Value::to_display_string)
        .collect();
    Ok(Value::from(parts.join(separator)))
}

fn order_by(cx: &mut FilterCx<'_>, source: &Value, key: &Value, descending: bool) -> EvalResult {
    let items = items_of(cx, source)?;
    let mut keyed = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        keyed.push((cx.apply(key, &item, index)?, item));
    }
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    Ok(Value::list(keyed.into_iter().map(|(_, item)| item).collect()))
}

fn select_keys(cx: &FilterCx<'_>, target: &Value, keys: &Value, keep: bool) -> EvalResult {
    let keys: Vec<String> = items_of(cx, keys)?
        .iter()
        .map(Value::to_display_string)
        .collect();
    let selected: ObjectMap = cx
        .own_properties(target)
        .into_iter()
        .filter(|(key, _)| keys.contains(key) == keep)
        .collect();
    Ok(Value::object(selected))
}

fn range(start: i64, n: usize) -> Value {
    let items = (0..n)
        .map_while(|i| i64::try_from(i).ok().and_then(|i| start.checked_add(i)))
        .map(Value::Int)
        .collect();
    Value::list(items)
}

fn flatten_into(items: &[Value], out: &mut Vec<Value>) {
    for item in items {
        match item.list_items() {
            Some(nested) => flatten_into(&nested, out),
            None => out.push(item.clone()),
        }
    }
}

fn length(cx: &FilterCx<'_>, value: &Value) -> EvalResult<Outcome> {
    let n = match value {
        Value::Undefined | Value::Null => 0,
        Value::Str(s) | Value::Raw(s) => s.chars().count(),
        Value::List(items) => items.read().len(),
        Value::Object(map) => map.read().len(),
        Value::Host(_) => cx.items(value)?.len(),
        other => return Err(not_supported(cx.name(), other)),
    };
    Ok(Value::from(n).into())
}
