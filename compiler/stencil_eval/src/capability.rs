//! Capability table: how member access, indexing and enumeration work for
//! each kind of value.
//!
//! Built-in kinds have fixed capabilities. Host types use
//! [`HostCapability`] unless the embedder registers one of its own for the
//! concrete type. Lookups are memoized per context; the first resolution of
//! a key wins and every later lookup reuses it.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use crate::errors::{cannot_index, index_out_of_range, no_property, EvalResult};
use crate::value::{ObjectMap, Value, ValueKind};

/// Access operations for one kind of value.
pub trait Capability: Send + Sync {
    /// `value.name`
    fn property(&self, value: &Value, name: &str) -> EvalResult;

    /// `value[index]`
    fn element(&self, value: &Value, index: &Value) -> EvalResult;

    /// Items for `each` and the collection filters, or `None` when the value
    /// is not enumerable.
    fn enumerate(&self, value: &Value) -> Option<Vec<Value>>;

    /// Named fields bound by `with`, `each` and object spreads.
    fn own_properties(&self, value: &Value) -> Vec<(String, Value)> {
        let _ = value;
        Vec::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityKey {
    Kind(ValueKind),
    Host(TypeId),
}

impl CapabilityKey {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Host(host) => CapabilityKey::Host(host.as_any().type_id()),
            other => CapabilityKey::Kind(other.kind()),
        }
    }
}

/// Per-context table of capabilities.
pub struct CapabilityTable {
    registered: FxHashMap<TypeId, Arc<dyn Capability>>,
    resolved: DashMap<CapabilityKey, Arc<dyn Capability>>,
}

impl CapabilityTable {
    pub fn new(registered: FxHashMap<TypeId, Arc<dyn Capability>>) -> Self {
        CapabilityTable {
            registered,
            resolved: DashMap::new(),
        }
    }

    /// Capability for `value`'s kind.
    pub fn lookup(&self, value: &Value) -> Arc<dyn Capability> {
        let key = CapabilityKey::of(value);
        if let Some(found) = self.resolved.get(&key) {
            return Arc::clone(found.value());
        }
        let capability = self.build(key);
        Arc::clone(self.resolved.entry(key).or_insert(capability).value())
    }

    fn build(&self, key: CapabilityKey) -> Arc<dyn Capability> {
        match key {
            CapabilityKey::Host(type_id) => self
                .registered
                .get(&type_id)
                .cloned()
                .unwrap_or_else(|| Arc::new(HostCapability)),
            CapabilityKey::Kind(ValueKind::Undefined | ValueKind::Null) => Arc::new(NullishCapability),
            CapabilityKey::Kind(ValueKind::Object) => Arc::new(ObjectCapability),
            CapabilityKey::Kind(ValueKind::List) => Arc::new(ListCapability),
            CapabilityKey::Kind(ValueKind::Str) => Arc::new(StringCapability),
            CapabilityKey::Kind(_) => Arc::new(ScalarCapability),
        }
    }

    pub fn property(&self, value: &Value, name: &str) -> EvalResult {
        self.lookup(value).property(value, name)
    }

    pub fn element(&self, value: &Value, index: &Value) -> EvalResult {
        self.lookup(value).element(value, index)
    }

    pub fn enumerate(&self, value: &Value) -> Option<Vec<Value>> {
        self.lookup(value).enumerate(value)
    }

    pub fn own_properties(&self, value: &Value) -> Vec<(String, Value)> {
        self.lookup(value).own_properties(value)
    }

    #[cfg(test)]
    pub(crate) fn resolved_len(&self) -> usize {
        self.resolved.len()
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        CapabilityTable::new(FxHashMap::default())
    }
}

fn list_index(index: &Value) -> Option<i64> {
    match index {
        Value::Int(n) => Some(*n),
        Value::Double(n) if n.fract() == 0.0 => index.to_i64(),
        Value::Str(s) if s.bytes().all(|b| b.is_ascii_digit()) && !s.is_empty() => index.to_i64(),
        _ => None,
    }
}

/// Position `index` in a sequence of `len` items.
fn checked_index(type_name: &str, index: i64, len: usize) -> EvalResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_range(type_name, index, len))
}

/// `undefined` and `null`: every step yields `undefined`.
struct NullishCapability;

impl Capability for NullishCapability {
    fn property(&self, _: &Value, _: &str) -> EvalResult {
        Ok(Value::Undefined)
    }

    fn element(&self, _: &Value, _: &Value) -> EvalResult {
        Ok(Value::Undefined)
    }

    fn enumerate(&self, _: &Value) -> Option<Vec<Value>> {
        Some(Vec::new())
    }
}

struct ObjectCapability;

impl Capability for ObjectCapability {
    fn property(&self, value: &Value, name: &str) -> EvalResult {
        Ok(value.get(name).unwrap_or_default())
    }

    fn element(&self, value: &Value, index: &Value) -> EvalResult {
        self.property(value, &index.to_display_string())
    }

    /// Entries as `{ key, value }` objects.
    fn enumerate(&self, value: &Value) -> Option<Vec<Value>> {
        let Value::Object(map) = value else {
            return None;
        };
        let entries = map
            .read()
            .iter()
            .map(|(key, value)| {
                let mut entry = ObjectMap::with_capacity(2);
                entry.insert("key".to_string(), Value::from(key.as_str()));
                entry.insert("value".to_string(), value.clone());
                Value::object(entry)
            })
            .collect();
        Some(entries)
    }

    fn own_properties(&self, value: &Value) -> Vec<(String, Value)> {
        match value {
            Value::Object(map) => map.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Vec::new(),
        }
    }
}

struct ListCapability;

impl Capability for ListCapability {
    fn property(&self, value: &Value, name: &str) -> EvalResult {
        match (value, name) {
            (Value::List(items), "length") => Ok(Value::from(items.read().len())),
            _ => Err(no_property(&value.type_name(), name)),
        }
    }

    fn element(&self, value: &Value, index: &Value) -> EvalResult {
        let Value::List(items) = value else {
            return Err(cannot_index(&value.type_name(), index));
        };
        match list_index(index) {
            Some(i) => {
                let items = items.read();
                let i = checked_index(&value.type_name(), i, items.len())?;
                Ok(items[i].clone())
            }
            None => match index {
                Value::Str(name) => self.property(value, name),
                _ => Err(cannot_index(&value.type_name(), index)),
            },
        }
    }

    fn enumerate(&self, value: &Value) -> Option<Vec<Value>> {
        value.list_items()
    }
}

struct StringCapability;

impl Capability for StringCapability {
    fn property(&self, value: &Value, name: &str) -> EvalResult {
        match (value.as_str(), name) {
            (Some(s), "length") => Ok(Value::from(s.chars().count())),
            _ => Err(no_property("String", name)),
        }
    }

    fn element(&self, value: &Value, index: &Value) -> EvalResult {
        let s = value.as_str().unwrap_or_default();
        match list_index(index) {
            Some(i) => {
                let chars: Vec<char> = s.chars().collect();
                let i = checked_index("String", i, chars.len())?;
                Ok(Value::from(chars[i].to_string()))
            }
            None => match index {
                Value::Str(name) => self.property(value, name),
                _ => Err(cannot_index("String", index)),
            },
        }
    }

    /// Characters.
    fn enumerate(&self, value: &Value) -> Option<Vec<Value>> {
        value
            .as_str()
            .map(|s| s.chars().map(|c| Value::from(c.to_string())).collect())
    }
}

/// Numbers, booleans and functions: no members.
struct ScalarCapability;

impl Capability for ScalarCapability {
    fn property(&self, value: &Value, name: &str) -> EvalResult {
        Err(no_property(&value.type_name(), name))
    }

    fn element(&self, value: &Value, index: &Value) -> EvalResult {
        Err(cannot_index(&value.type_name(), index))
    }

    fn enumerate(&self, _: &Value) -> Option<Vec<Value>> {
        None
    }
}

/// Default access for host values, through [`crate::HostObject`].
pub struct HostCapability;

impl Capability for HostCapability {
    fn property(&self, value: &Value, name: &str) -> EvalResult {
        let Value::Host(host) = value else {
            return Err(no_property(&value.type_name(), name));
        };
        if let Some(field) = host.property(name) {
            return Ok(field);
        }
        match (name, host.items()) {
            ("length", Some(items)) => Ok(Value::from(items.len())),
            _ => Err(no_property(host.type_name(), name)),
        }
    }

    fn element(&self, value: &Value, index: &Value) -> EvalResult {
        let Value::Host(host) = value else {
            return Err(cannot_index(&value.type_name(), index));
        };
        match (index, list_index(index), host.items()) {
            (_, Some(i), Some(items)) => {
                let i = checked_index(host.type_name(), i, items.len())?;
                Ok(items[i].clone())
            }
            (Value::Str(name), _, _) => self.property(value, name),
            _ => Err(cannot_index(host.type_name(), index)),
        }
    }

    fn enumerate(&self, value: &Value) -> Option<Vec<Value>> {
        match value {
            Value::Host(host) => host.items(),
            _ => None,
        }
    }

    fn own_properties(&self, value: &Value) -> Vec<(String, Value)> {
        let Value::Host(host) = value else {
            return Vec::new();
        };
        host.property_names()
            .into_iter()
            .filter_map(|name| host.property(&name).map(|field| (name, field)))
            .collect()
    }
}
