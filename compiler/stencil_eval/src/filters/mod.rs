//! Filters: definitions, providers and the per-context registry.
//!
//! A filter is a named function over evaluated arguments. In a pipeline the
//! value flowing in becomes the first argument when the chosen definition
//! takes one more parameter than was written (`{{ 1 | add(2) }}` calls
//! `add(1, 2)`); a definition taking exactly the written arguments ignores
//! the piped value.
//!
//! Resolution is by `(name, argument count)` and is memoized per context.
//! Providers registered first win a name/arity pair, so user providers can
//! shadow the default library.

mod cx;
pub mod library;

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::context::Services;
use crate::errors::EvalResult;
use crate::pending::Outcome;
use crate::Value;

pub use cx::FilterCx;

bitflags! {
    /// Static properties of a filter.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FilterFlags: u8 {
        /// Writes nothing (assignment, control and directive filters). A
        /// newline right after a fragment ending in one is dropped.
        const NO_OUTPUT = 1 << 0;
        /// Still runs after an error switched the page to skipping.
        const EVAL_WHEN_SKIPPING = 1 << 1;
        /// Raises errors on purpose; they escape with their own message.
        const THROWS = 1 << 2;
    }
}

/// Declared parameter type. Arguments are coerced before the call; a value
/// that does not convert is passed unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamShape {
    Any,
    Int,
    Double,
    Str,
    Bool,
}

impl ParamShape {
    pub fn coerce(self, value: Value) -> Value {
        match (self, &value) {
            (ParamShape::Any, _)
            | (ParamShape::Int, Value::Int(_))
            | (ParamShape::Double, Value::Double(_))
            | (ParamShape::Str, Value::Str(_) | Value::Raw(_))
            | (ParamShape::Bool, Value::Bool(_)) => value,
            (ParamShape::Int, Value::Double(_) | Value::Str(_)) => {
                value.to_i64().map_or(value, Value::Int)
            }
            (ParamShape::Double, Value::Int(_) | Value::Str(_)) => {
                value.to_f64().map_or(value, Value::Double)
            }
            (ParamShape::Str, Value::Int(_) | Value::Double(_) | Value::Bool(_)) => {
                Value::from(value.to_display_string())
            }
            (ParamShape::Bool, Value::Str(s)) => match &**s {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => value,
            },
            _ => value,
        }
    }
}

pub type FilterFn =
    dyn Fn(&mut FilterCx<'_>, &[Value]) -> EvalResult<Outcome> + Send + Sync;

/// One filter overload.
#[derive(Clone)]
pub struct FilterDef {
    pub name: String,
    pub params: Vec<ParamShape>,
    /// Accepts any number of arguments from `params.len()` up.
    pub variadic: bool,
    pub flags: FilterFlags,
    func: Arc<FilterFn>,
}

impl FilterDef {
    /// A filter with full access to the render.
    pub fn new(
        name: impl Into<String>,
        params: &[ParamShape],
        func: impl Fn(&mut FilterCx<'_>, &[Value]) -> EvalResult<Outcome> + Send + Sync + 'static,
    ) -> Self {
        FilterDef {
            name: name.into(),
            params: params.to_vec(),
            variadic: false,
            flags: FilterFlags::empty(),
            func: Arc::new(func),
        }
    }

    /// A pure function of its arguments.
    pub fn value(
        name: impl Into<String>,
        params: &[ParamShape],
        func: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        FilterDef::new(name, params, move |_, args| func(args).map(Outcome::Value))
    }

    /// `n` untyped parameters.
    pub fn any(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        FilterDef::value(name, &vec![ParamShape::Any; arity], func)
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: FilterFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// The same body under another name.
    #[must_use]
    pub fn alias(&self, name: impl Into<String>) -> Self {
        FilterDef {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn call(&self, cx: &mut FilterCx<'_>, args: Vec<Value>) -> EvalResult<Outcome> {
        let args: SmallVec<[Value; 4]> = args
            .into_iter()
            .enumerate()
            .map(|(i, arg)| match self.params.get(i) {
                Some(shape) => shape.coerce(arg),
                None => arg,
            })
            .collect();
        (self.func)(cx, &args)
    }
}

impl fmt::Debug for FilterDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// A source of filters. Called once when the context is built.
pub trait FilterProvider: Send + Sync {
    fn filters(&self, services: &Services) -> Vec<FilterDef>;
}

/// A chosen overload. `consumes` is set when the piped value is passed as
/// the first argument.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub def: Arc<FilterDef>,
    pub consumes: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    name: String,
    argc: usize,
    piped: bool,
}

/// Filters of one context.
pub struct FilterRegistry {
    by_name: FxHashMap<String, Vec<Arc<FilterDef>>>,
    excluded: FxHashSet<String>,
    resolved: DashMap<CacheKey, Option<Resolved>>,
}

impl FilterRegistry {
    pub fn new(excluded: FxHashSet<String>) -> Self {
        FilterRegistry {
            by_name: FxHashMap::default(),
            excluded,
            resolved: DashMap::new(),
        }
    }

    /// Add a definition. An earlier definition of the same name and arity
    /// is kept.
    pub fn register(&mut self, def: FilterDef) {
        let overloads = self.by_name.entry(def.name.clone()).or_default();
        if overloads
            .iter()
            .any(|existing| existing.arity() == def.arity() && existing.variadic == def.variadic)
        {
            return;
        }
        overloads.push(Arc::new(def));
        self.resolved.clear();
    }

    pub fn register_all(&mut self, provider: &dyn FilterProvider, services: &Services) {
        for def in provider.filters(services) {
            self.register(def);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.excluded.contains(name) && self.by_name.contains_key(name)
    }

    /// Names of every filter with the given flag.
    pub fn names_with(&self, flag: FilterFlags) -> FxHashSet<String> {
        self.by_name
            .iter()
            .filter(|(name, defs)| {
                !self.excluded.contains(*name) && defs.iter().any(|def| def.flags.contains(flag))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn flags_of(&self, name: &str) -> FilterFlags {
        self.by_name
            .get(name)
            .map(|defs| defs.iter().fold(FilterFlags::empty(), |acc, def| acc | def.flags))
            .unwrap_or_default()
    }

    /// A pipeline step with `argc` written arguments: exact arity taking the
    /// piped value, then exact arity ignoring it, then a variadic overload
    /// taking it.
    pub fn resolve_piped(&self, name: &str, argc: usize) -> Option<Resolved> {
        self.memoized(name, argc, true, |defs| {
            find_exact(defs, argc + 1)
                .map(|def| Resolved { def, consumes: true })
                .or_else(|| find_exact(defs, argc).map(|def| Resolved { def, consumes: false }))
                .or_else(|| find_variadic(defs, argc + 1).map(|def| Resolved { def, consumes: true }))
        })
    }

    /// A direct call with `argc` arguments: exact arity, then variadic.
    pub fn resolve_call(&self, name: &str, argc: usize) -> Option<Resolved> {
        self.memoized(name, argc, false, |defs| {
            find_exact(defs, argc)
                .or_else(|| find_variadic(defs, argc))
                .map(|def| Resolved { def, consumes: false })
        })
    }

    fn memoized(
        &self,
        name: &str,
        argc: usize,
        piped: bool,
        choose: impl FnOnce(&[Arc<FilterDef>]) -> Option<Resolved>,
    ) -> Option<Resolved> {
        let key = CacheKey {
            name: name.to_string(),
            argc,
            piped,
        };
        if let Some(hit) = self.resolved.get(&key) {
            return hit.value().clone();
        }
        let found = if self.excluded.contains(name) {
            None
        } else {
            self.by_name.get(name).and_then(|defs| choose(defs))
        };
        debug!(filter = name, argc, piped, found = found.is_some(), "resolved filter");
        self.resolved.entry(key).or_insert(found).value().clone()
    }
}

fn find_exact(defs: &[Arc<FilterDef>], arity: usize) -> Option<Arc<FilterDef>> {
    defs.iter()
        .find(|def| !def.variadic && def.arity() == arity)
        .cloned()
}

fn find_variadic(defs: &[Arc<FilterDef>], argc: usize) -> Option<Arc<FilterDef>> {
    defs.iter()
        .find(|def| def.variadic && def.arity() <= argc)
        .cloned()
}
