//! The default filter library.
//!
//! Each submodule contributes one family:
//!
//! - `math`: arithmetic and rounding
//! - `compare`: equality, ordering and predicates
//! - `strings`: text manipulation and formatting
//! - `collections`: enumeration, projection and shaping
//! - `conditional`: value selection and pipeline control (`end*`, `only*`,
//!   `if*`, `use`, `show`)
//! - `assign`: writing bindings
//! - `templates`: partials, inline templates and encoding
//! - `errors`: throwing, inspecting and rendering errors
//!
//! `delay` lives here; it returns a pending value.

mod assign;
mod collections;
mod compare;
mod conditional;
mod errors;
mod math;
mod strings;
mod templates;

use std::time::Duration;

use crate::context::Services;
use crate::errors::{argument_error, EvalError, EvalResult};
use crate::filters::{FilterDef, FilterProvider, ParamShape};
use crate::pending::{delayed, Outcome};
use crate::Value;

/// The built-in filters. Registered after user providers, so any of these
/// can be shadowed.
pub struct DefaultFilters;

impl FilterProvider for DefaultFilters {
    fn filters(&self, _services: &Services) -> Vec<FilterDef> {
        let mut defs = Vec::with_capacity(320);
        defs.extend(math::filters());
        defs.extend(compare::filters());
        defs.extend(strings::filters());
        defs.extend(collections::filters());
        defs.extend(conditional::filters());
        defs.extend(assign::filters());
        defs.extend(templates::filters());
        defs.extend(errors::filters());
        defs.extend(async_filters());
        defs
    }
}

fn async_filters() -> Vec<FilterDef> {
    vec![
        FilterDef::new("delay", &[ParamShape::Int], |cx, args| {
            let ms = millis(cx.name(), &args[0])?;
            Ok(Outcome::Pending(delayed(Value::Undefined, ms)))
        }),
        FilterDef::new("delay", &[ParamShape::Any, ParamShape::Int], |cx, args| {
            let ms = millis(cx.name(), &args[1])?;
            Ok(Outcome::Pending(delayed(args[0].clone(), ms)))
        }),
    ]
}

fn millis(filter: &str, value: &Value) -> EvalResult<Duration> {
    value
        .to_i64()
        .and_then(|ms| u64::try_from(ms).ok())
        .map(Duration::from_millis)
        .ok_or_else(|| argument_error(filter, format_args!("'{value}' is not a duration in milliseconds")))
}

/// A filter whose outcome depends only on its arguments.
fn outcome(
    name: &str,
    arity: usize,
    f: impl Fn(&[Value]) -> Outcome + Send + Sync + 'static,
) -> FilterDef {
    FilterDef::new(name, &vec![ParamShape::Any; arity], move |_, args| Ok(f(args)))
}

/// Register `def` under each name in `aliases` too.
fn with_aliases(def: FilterDef, aliases: &[&str]) -> Vec<FilterDef> {
    let mut defs: Vec<FilterDef> = aliases.iter().map(|alias| def.alias(*alias)).collect();
    defs.insert(0, def);
    defs
}

/// A non-negative count argument.
fn count(filter: &str, value: &Value) -> EvalResult<usize> {
    value
        .to_i64()
        .map(|n| usize::try_from(n).unwrap_or(0))
        .ok_or_else(|| argument_error(filter, format_args!("'{value}' is not a number")))
}

/// A numeric argument.
fn number(filter: &str, value: &Value) -> EvalResult<Value> {
    value
        .to_number()
        .ok_or_else(|| argument_error(filter, format_args!("'{value}' is not a number")))
}

fn not_supported(filter: &str, value: &Value) -> EvalError {
    argument_error(filter, format_args!("'{}' is not supported", value.type_name()))
}

#[cfg(test)]
mod tests;
