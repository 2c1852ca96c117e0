//! Resource identity and the local collection a command keeps in sync.
//!
//! A [`Collection`] is ordered and never holds two elements with the same id.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Server-issued identifier. Backends use integers or strings; numeric
/// strings are always read as integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Str(String),
}

impl ResourceId {
    /// Reads an id from a JSON value. Numeric strings become integer ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ResourceId::Int),
            Value::String(s) if !s.trim().is_empty() => s.parse().ok(),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ResourceId::Int(n) => Value::from(*n),
            ResourceId::Str(s) => Value::from(s.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ResourceId::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid id: {}", value))
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(n) => write!(f, "{}", n),
            ResourceId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for ResourceId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(n) => ResourceId::Int(n),
            Err(_) => ResourceId::Str(s.to_string()),
        })
    }
}

impl From<i64> for ResourceId {
    fn from(n: i64) -> Self {
        ResourceId::Int(n)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_else(|e| match e {})
    }
}

/// A backend-managed record with a unique id.
pub trait Resource: Clone + 'static {
    fn id(&self) -> ResourceId;
}

/// An untyped resource: the id plus every other field as sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: ResourceId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Renders a field for display; strings lose their quotes, null becomes empty.
    pub fn display_field(&self, field: &str) -> String {
        match self.fields.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(obj)) => obj
                .get("name")
                .or_else(|| obj.get("id"))
                .map(|v| v.to_string().trim_matches('"').to_string())
                .unwrap_or_default(),
            Some(other) => other.to_string(),
        }
    }
}

impl Resource for Record {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}

/// Ordered, id-unique sequence of resources of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Resource> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection in the given order. Later duplicates of an id are dropped.
    pub fn from_items(items: Vec<T>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id()))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ResourceId) -> Option<&T> {
        self.items.iter().find(|item| &item.id() == id)
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> Vec<ResourceId> {
        self.items.iter().map(Resource::id).collect()
    }

    fn position(&self, id: &ResourceId) -> Option<usize> {
        self.items.iter().position(|item| &item.id() == id)
    }

    /// Inserts at the front. An element already carrying the same id is removed first.
    pub fn prepend(&mut self, item: T) {
        let id = item.id();
        self.items.retain(|existing| existing.id() != id);
        self.items.insert(0, item);
    }

    /// Replaces the element whose id is `id` with `item`, keeping its position.
    ///
    /// Returns false and leaves the collection untouched if `id` is absent.
    pub fn replace(&mut self, id: &ResourceId, item: T) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let new_id = item.id();
        if &new_id != id {
            // Keep ids unique if the server answered with a different id.
            let mut i = 0;
            self.items.retain(|existing| {
                let keep = i == index || existing.id() != new_id;
                i += 1;
                keep
            });
        }
        let index = self.position(id).unwrap_or(0);
        self.items[index] = item;
        true
    }
}
