//! Filters that write bindings.
//!
//! Targets are given by name. `assign` also accepts a member path
//! (`'user.name'`, `'rows[0]'`), which writes into the container in place.
//! Plain names go to the nearest frame that already binds them, else the
//! page frame; the `*Global` forms always write the page frame.

use stencil_ir::Expr;

use crate::errors::{cannot_index, EvalResult};
use crate::filters::{FilterCx, FilterDef, FilterFlags, ParamShape};
use crate::pending::Outcome;
use crate::scope::ScopeFrame;
use crate::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Target {
    Nearest,
    Page,
}

impl Target {
    fn bind(self, frame: &ScopeFrame, name: &str, value: Value) {
        match self {
            Target::Nearest => frame.assign(name, value),
            Target::Page => frame.assign_page(name, value),
        }
    }

    fn current(self, frame: &ScopeFrame, name: &str) -> Option<Value> {
        match self {
            Target::Nearest => frame.lookup(name),
            Target::Page => frame.page_frame().lookup(name),
        }
    }
}

type Writer = fn(&mut FilterCx<'_>, Target, &Value, &str) -> EvalResult<()>;

pub(super) fn filters() -> Vec<FilterDef> {
    let mut defs = Vec::new();
    for (name, target) in [("assign", Target::Nearest), ("assignGlobal", Target::Page)] {
        defs.push(writer(
            name,
            target,
            |cx, target, value, path| assign_path(cx, target, path, value.clone()),
            true,
        ));
    }
    let writers: [(&str, Writer); 4] = [
        ("assignTo", |cx, target, value, name| {
            target.bind(cx.frame(), name, value.clone());
            Ok(())
        }),
        ("addTo", add_to),
        ("appendTo", |cx, target, value, name| concat(cx, target, value, name, false)),
        ("prependTo", |cx, target, value, name| concat(cx, target, value, name, true)),
    ];
    for (name, write) in writers {
        defs.push(writer(name, Target::Nearest, write, false));
        defs.push(writer(&format!("{name}Global"), Target::Page, write, false));
    }
    defs
}

/// `name(value, target)`, or `name(target, value)` when `target_first`.
fn writer(name: &str, target: Target, write: Writer, target_first: bool) -> FilterDef {
    FilterDef::new(name, &[ParamShape::Any, ParamShape::Any], move |cx, args| {
        let (path, value) = if target_first {
            (&args[0], &args[1])
        } else {
            (&args[1], &args[0])
        };
        let path = path.to_display_string();
        if path.is_empty() {
            return Err(cx.error("a binding name is required"));
        }
        write(cx, target, value, &path)?;
        Ok(Outcome::IGNORE)
    })
    .flags(FilterFlags::NO_OUTPUT)
}

fn assign_path(cx: &mut FilterCx<'_>, target: Target, path: &str, value: Value) -> EvalResult<()> {
    let expr = cx.context().expression(path)?;
    let frame = cx.frame().clone();
    match &*expr {
        Expr::Identifier(name) => {
            target.bind(&frame, name, value);
            Ok(())
        }
        Expr::Member {
            object,
            key,
            computed,
        } => {
            let root = root_name(object).unwrap_or_default();
            if !frame.contains(root) {
                return Err(cx.error(format_args!("cannot assign to non-existing '{root}' in '{path}'")));
            }
            let container = cx.interpreter().eval(object, &frame)?;
            let key = if *computed {
                cx.interpreter().eval(key, &frame)?
            } else {
                Value::from(key.as_identifier().unwrap_or_default())
            };
            set_member(&container, &key, value)
        }
        _ => Err(cx.error(format_args!("'{path}' is not assignable"))),
    }
}

fn root_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier(name) => Some(name),
        Expr::Member { object, .. } => root_name(object),
        _ => None,
    }
}

/// Write `key` of a list or object in place. Writing one past the end of a
/// list appends.
fn set_member(container: &Value, key: &Value, value: Value) -> EvalResult<()> {
    match container {
        Value::Object(map) => {
            map.write().insert(key.to_display_string(), value);
            Ok(())
        }
        Value::List(items) => {
            let mut items = items.write();
            let index = key
                .to_i64()
                .and_then(|i| usize::try_from(i).ok())
                .filter(|i| *i <= items.len())
                .ok_or_else(|| cannot_index("list", key))?;
            if index == items.len() {
                items.push(value);
            } else {
                items[index] = value;
            }
            Ok(())
        }
        other => Err(cannot_index(&other.type_name(), key)),
    }
}

fn add_to(cx: &mut FilterCx<'_>, target: Target, value: &Value, name: &str) -> EvalResult<()> {
    if value.is_nullish() {
        return Ok(());
    }
    match target.current(cx.frame(), name) {
        Some(Value::List(items)) => {
            let more = value.list_items().unwrap_or_else(|| vec![value.clone()]);
            items.write().extend(more);
        }
        Some(Value::Object(map)) => {
            let additions = cx.own_properties(value);
            map.write().extend(additions);
        }
        None | Some(Value::Undefined | Value::Null) => {
            let list = match value {
                Value::List(_) => value.clone(),
                other => Value::list(vec![other.clone()]),
            };
            target.bind(cx.frame(), name, list);
        }
        Some(other) => {
            return Err(cx.error(format_args!("can only add to a list, not '{}'", other.type_name())));
        }
    }
    Ok(())
}

/// Append (or prepend) text to a string binding. Non-string bindings are
/// left alone.
fn concat(cx: &mut FilterCx<'_>, target: Target, value: &Value, name: &str, prepend: bool) -> EvalResult<()> {
    if value.is_nullish() {
        return Ok(());
    }
    let text = value.to_display_string();
    let joined = |existing: &str| {
        if prepend {
            format!("{text}{existing}")
        } else {
            format!("{existing}{text}")
        }
    };
    let next = match target.current(cx.frame(), name) {
        None | Some(Value::Undefined | Value::Null) => value.clone(),
        Some(Value::Str(existing)) => Value::from(joined(&*existing)),
        Some(Value::Raw(existing)) => Value::raw(joined(&*existing)),
        Some(_) => return Ok(()),
    };
    target.bind(cx.frame(), name, next);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_members_append_one_past_the_end() {
        let list = Value::list(vec![Value::Int(1)]);
        set_member(&list, &Value::Int(1), Value::Int(2)).unwrap();
        set_member(&list, &Value::Int(0), Value::Int(0)).unwrap();
        assert_eq!(list.list_items().unwrap(), vec![Value::Int(0), Value::Int(2)]);
        assert!(set_member(&list, &Value::Int(5), Value::Int(9)).is_err());
    }

    #[test]
    fn object_members_are_inserted() {
        let object = Value::object_from([("a", Value::Int(1))]);
        set_member(&object, &Value::from("b"), Value::Int(2)).unwrap();
        assert_eq!(object.get("b"), Some(Value::Int(2)));
    }

    #[test]
    fn scalars_cannot_be_indexed() {
        assert!(set_member(&Value::Int(1), &Value::from("x"), Value::Null).is_err());
    }
}
