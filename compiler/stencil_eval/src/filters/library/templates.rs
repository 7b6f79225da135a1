//! Partials, per-item templates and output encoding (`raw`, `htmlEncode`,
//! `json`, `markdown`).
//!
//! A partial is looked up first among the `{{#partial}}` blocks of the
//! current render, then as a page (`name`, then `_name-partial`) from the
//! rendering page's directory outward. It renders in a child of the caller's
//! scope with the partial's declared arguments, then the call's arguments,
//! bound; the call's arguments are also bound as `it`.

use std::sync::Arc;

use stencil_ir::PageFragment;

use crate::context::cascade;
use crate::errors::{partial_not_found, EvalErrorKind, EvalResult};
use crate::filters::{FilterCx, FilterDef, ParamShape};
use crate::page::OneTimePage;
use crate::pending::Outcome;
use crate::render::html_encode;
use crate::value::to_json;
use crate::Value;

pub(super) fn filters() -> Vec<FilterDef> {
    vec![
        FilterDef::new("partial", &[ParamShape::Str], |cx, args| {
            partial(cx, &args[0].to_display_string(), &Value::Undefined).map(Outcome::Value)
        }),
        FilterDef::new("partial", &[ParamShape::Str, ParamShape::Any], |cx, args| {
            partial(cx, &args[0].to_display_string(), &args[1]).map(Outcome::Value)
        }),
        FilterDef::new("select", &[ParamShape::Any, ParamShape::Str], |cx, args| {
            select(cx, &args[0], &args[1].to_display_string(), &Value::Undefined).map(Outcome::Value)
        }),
        FilterDef::new("select", &[ParamShape::Any, ParamShape::Str, ParamShape::Any], |cx, args| {
            select(cx, &args[0], &args[1].to_display_string(), &args[2]).map(Outcome::Value)
        }),
        FilterDef::new("selectPartial", &[ParamShape::Any, ParamShape::Str], |cx, args| {
            select_partial(cx, &args[0], &args[1].to_display_string(), &Value::Undefined)
                .map(Outcome::Value)
        }),
        FilterDef::new(
            "selectPartial",
            &[ParamShape::Any, ParamShape::Str, ParamShape::Any],
            |cx, args| {
                select_partial(cx, &args[0], &args[1].to_display_string(), &args[2])
                    .map(Outcome::Value)
            },
        ),
        FilterDef::new("evalTemplate", &[ParamShape::Str], |cx, args| {
            eval_template(cx, &args[0].to_display_string(), &Value::Undefined).map(Outcome::Value)
        }),
        FilterDef::new("evalTemplate", &[ParamShape::Str, ParamShape::Any], |cx, args| {
            eval_template(cx, &args[0].to_display_string(), &args[1]).map(Outcome::Value)
        }),
        FilterDef::any("raw", 1, |args| {
            Ok(match &args[0] {
                nullish if nullish.is_nullish() => nullish.clone(),
                Value::Raw(_) => args[0].clone(),
                other => Value::raw(other.to_display_string()),
            })
        }),
        FilterDef::any("htmlEncode", 1, |args| {
            Ok(Value::raw(html_encode(&args[0].to_display_string()).into_owned()))
        }),
        FilterDef::any("json", 1, |args| Ok(Value::raw(to_json(&args[0]).to_string()))),
        FilterDef::new("markdown", &[ParamShape::Str], |cx, args| {
            if args[0].is_nullish() {
                return Ok(Outcome::Value(args[0].clone()));
            }
            let html = (cx.context().markdown())(&args[0].to_display_string());
            Ok(Outcome::Value(Value::raw(html)))
        }),
    ]
}

struct Resolved {
    fragments: Arc<Vec<PageFragment>>,
    args: Vec<(String, Value)>,
}

fn resolve_partial(cx: &mut FilterCx<'_>, name: &str) -> EvalResult<Resolved> {
    if let Some(partial) = cx.interpreter().partial(name) {
        return Ok(Resolved {
            fragments: partial.fragments,
            args: partial.args.into_iter().collect(),
        });
    }
    let mut candidates = vec![name.to_string()];
    if !name.starts_with('_') {
        candidates.push(format!("_{name}-partial"));
    }
    let dir = cx.interpreter().page_dir().to_string();
    for candidate in candidates {
        let context = cx.context();
        let file = context.config().with_extension(&candidate);
        let path = cascade(context.files(), &dir, &file).unwrap_or(candidate);
        match context.compile_page(&path) {
            Ok(page) => {
                return Ok(Resolved {
                    fragments: Arc::clone(&page.fragments),
                    args: page.args.clone(),
                })
            }
            Err(err) if matches!(err.kind, EvalErrorKind::PageNotFound { .. }) => {}
            Err(err) => return Err(err),
        }
    }
    Err(partial_not_found(name))
}

fn partial(cx: &mut FilterCx<'_>, name: &str, args: &Value) -> EvalResult {
    let resolved = resolve_partial(cx, name)?;
    let call_args = cx.own_properties(args);
    let frame = cx.frame().child();
    frame.set_all(resolved.args);
    frame.set_all(call_args.clone());
    frame.set("it", Value::object_from(call_args));
    let out = cx.render_nested(format!("Partial: {name}"), &resolved.fragments, &frame)?;
    Ok(Value::raw(out))
}

/// A list or enumerable host value is rendered per item; anything else is
/// one item.
fn sequence(cx: &FilterCx<'_>, target: &Value) -> Vec<Value> {
    match target {
        Value::List(_) | Value::Host(_) => cx
            .items(target)
            .unwrap_or_else(|_| vec![target.clone()]),
        _ => vec![target.clone()],
    }
}

/// Name the item is bound to: the `it` option, else `it`.
fn item_binding(options: &Value) -> String {
    options
        .get("it")
        .map_or_else(|| "it".to_string(), |name| name.to_display_string())
}

fn select(cx: &mut FilterCx<'_>, target: &Value, template: &str, options: &Value) -> EvalResult {
    if target.is_nullish() {
        return Ok(Value::raw(""));
    }
    let template = unescape(template);
    let binding = item_binding(options);
    let scoped = cx.own_properties(options);
    let mut out = String::new();
    for (index, item) in sequence(cx, target).into_iter().enumerate() {
        let mut bindings = scoped.clone();
        bindings.push((binding.clone(), item));
        bindings.push(("index".to_string(), Value::from(index)));
        out.push_str(&cx.render_template(&template, bindings)?);
    }
    Ok(Value::raw(out))
}

fn select_partial(cx: &mut FilterCx<'_>, target: &Value, name: &str, options: &Value) -> EvalResult {
    if target.is_nullish() {
        return Ok(Value::raw(""));
    }
    let resolved = resolve_partial(cx, name)?;
    let binding = item_binding(options);
    let scoped = cx.own_properties(options);
    let mut out = String::new();
    for (index, item) in sequence(cx, target).into_iter().enumerate() {
        let frame = cx.frame().child();
        frame.set_all(resolved.args.clone());
        frame.set_all(scoped.clone());
        frame.set(binding.clone(), item);
        frame.set("index", Value::from(index));
        out.push_str(&cx.render_nested(format!("Partial: {name}"), &resolved.fragments, &frame)?);
    }
    Ok(Value::raw(out))
}

/// Render template text as a one-time page: fresh page scope over the
/// context's globals, with only `args` bound.
fn eval_template(cx: &mut FilterCx<'_>, source: &str, args: &Value) -> EvalResult {
    if source.is_empty() {
        return Ok(Value::Null);
    }
    let fragments = cx.context().template(source)?;
    let frame = cx.context().globals().page();
    frame.set_all(cx.own_properties(args));
    let out = cx.render_nested(format!("Page: {}", OneTimePage::PATH), &fragments, &frame)?;
    Ok(Value::raw(out))
}

/// Escapes in free-form template arguments: `\n`, `\t`, `\\`.
fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
