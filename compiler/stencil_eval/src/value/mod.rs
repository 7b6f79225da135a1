//! Runtime values.
//!
//! Scalars are inline; strings are `Arc<str>`. Lists and objects are shared
//! behind a lock so assignment filters (`addTo`, `assign('a[0]', v)`) can
//! mutate a container in place and every binding that refers to it sees the
//! change. Objects keep insertion order.
//!
//! `Raw` is a string that is already encoded for the output format and is
//! written as is.

mod compare;
mod convert;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use stencil_ir::Expr;

use crate::scope::ScopeFrame;

pub use compare::{compare_values, loose_equals, strict_equals};
pub use convert::{from_json, to_json};
pub(crate) use convert::truncate;

pub type ObjectMap = IndexMap<String, Value>;

/// A lock-protected container shared by every value that refers to it.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

/// An arrow function with the scope it was created in.
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Expr,
    pub frame: ScopeFrame,
}

/// A value owned by the embedding program.
///
/// Templates reach into host values through the context's capability table;
/// the default capability uses the methods below.
pub trait HostObject: Any + Send + Sync + fmt::Debug {
    fn type_name(&self) -> &str;

    /// Named field, or `None` when the type has no such field.
    fn property(&self, name: &str) -> Option<Value>;

    /// Field names, in display order. Used by `with`, `each` and spreads.
    fn property_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Elements when the value is enumerable.
    fn items(&self) -> Option<Vec<Value>> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone, Default)]
pub enum Value {
    /// A binding that does not exist. Renders as nothing.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Arc<str>),
    /// Pre-encoded output.
    Raw(Arc<str>),
    List(Shared<Vec<Value>>),
    Object(Shared<ObjectMap>),
    Function(Arc<Lambda>),
    Host(Arc<dyn HostObject>),
}

/// Value categories, used as capability keys and in messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Null,
    Bool,
    Int,
    Double,
    Str,
    List,
    Object,
    Function,
    Host,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Undefined => "Undefined",
            ValueKind::Null => "Null",
            ValueKind::Bool => "Bool",
            ValueKind::Int => "Int",
            ValueKind::Double => "Double",
            ValueKind::Str => "String",
            ValueKind::List => "List",
            ValueKind::Object => "Object",
            ValueKind::Function => "Function",
            ValueKind::Host => "Host",
        }
    }
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn raw(s: impl Into<Arc<str>>) -> Self {
        Value::Raw(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Shared::new(items))
    }

    pub fn object(map: ObjectMap) -> Self {
        Value::Object(Shared::new(map))
    }

    /// Object from `(key, value)` pairs, in order.
    pub fn object_from<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn host(object: impl HostObject) -> Self {
        Value::Host(Arc::new(object))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) | Value::Raw(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
            Value::Function(_) => ValueKind::Function,
            Value::Host(_) => ValueKind::Host,
        }
    }

    /// Type name for messages and `typeName`.
    pub fn type_name(&self) -> String {
        match self {
            Value::Host(host) => host.type_name().to_string(),
            other => other.kind().as_str().to_string(),
        }
    }

    /// `undefined` or `null`.
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    /// String content of `Str` and `Raw`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Raw(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Strictly `true`: the test used by `ifDo`, `onlyIf` and friends.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Falsy: undefined, null, false, 0, 0.0, NaN, "" or an empty collection.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Double(n) => *n == 0.0 || n.is_nan(),
            Value::Str(s) | Value::Raw(s) => s.is_empty(),
            Value::List(items) => items.read().is_empty(),
            Value::Object(map) => map.read().is_empty(),
            Value::Function(_) => false,
            Value::Host(host) => host.items().is_some_and(|items| items.is_empty()),
        }
    }

    #[inline]
    pub fn is_truthy(&self) -> bool {
        !self.is_falsy()
    }

    /// Null, empty string or empty collection.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => true,
            Value::Str(s) | Value::Raw(s) => s.is_empty(),
            Value::List(items) => items.read().is_empty(),
            Value::Object(map) => map.read().is_empty(),
            Value::Host(host) => host.items().is_some_and(|items| items.is_empty()),
            _ => false,
        }
    }

    /// Snapshot of list elements.
    pub fn list_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.read().clone()),
            _ => None,
        }
    }

    /// Look up a key of an object value.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.read().get(key).cloned(),
            Value::Host(host) => host.property(key),
            _ => None,
        }
    }

    /// A detached copy: containers are copied one level deep.
    #[must_use]
    pub fn shallow_copy(&self) -> Value {
        match self {
            Value::List(items) => Value::list(items.read().clone()),
            Value::Object(map) => Value::object(map.read().clone()),
            other => other.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Value::Double(n as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<ObjectMap> for Value {
    fn from(map: ObjectMap) -> Self {
        Value::object(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl PartialEq for Value {
    /// Structural equality for tests and `distinct`; numbers compare by value.
    fn eq(&self, other: &Self) -> bool {
        strict_equals(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Double(n) => write!(f, "Double({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Raw(s) => write!(f, "Raw({s:?})"),
            Value::List(items) => f.debug_list().entries(items.read().iter()).finish(),
            Value::Object(map) => f.debug_map().entries(map.read().iter()).finish(),
            Value::Function(lambda) => write!(f, "Function({})", lambda.params.join(", ")),
            Value::Host(host) => write!(f, "Host({host:?})"),
        }
    }
}

impl fmt::Display for Value {
    /// Output text: scalars as written, containers as JSON, nothing for
    /// undefined and null.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined | Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(n) => f.write_str(&convert::format_double(*n)),
            Value::Str(s) | Value::Raw(s) => f.write_str(s),
            Value::List(_) | Value::Object(_) => f.write_str(&to_json(self).to_string()),
            Value::Function(lambda) => write!(f, "({}) => {}", lambda.params.join(", "), lambda.body),
            Value::Host(host) => f.write_str(host.type_name()),
        }
    }
}
