//! Form value store
//!
//! Field values live in one nested JSON value: objects keyed by element
//! names and `@attr` names, arrays for repeated elements, strings at the
//! leaves. Every access goes through a [`Path`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::warn;

use crate::error::{Error, Result};
use crate::paths::{Path, Segment};

/// Path-addressed form values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueStore {
    root: Value,
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueStore {
    /// An empty store
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Wrap a JSON object
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) => Ok(Self { root: value }),
            other => Err(Error::Value(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The stored values as JSON
    pub fn to_json(&self) -> &Value {
        &self.root
    }

    /// Consume the store, returning its JSON
    pub fn into_json(self) -> Value {
        self.root
    }

    /// Value at `path`; `None` when any step is missing
    pub fn get(&self, path: &Path) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(&self.root, |current, segment| step(current, segment))
    }

    /// Scalar text at `path`, see [`leaf_text`]
    pub fn get_text(&self, path: &Path) -> Option<Cow<'_, str>> {
        self.get(path).and_then(leaf_text)
    }

    fn get_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut current = &mut self.root;
        for segment in path.segments() {
            current = match (current, segment) {
                (Value::Array(items), Segment::Index(i)) => items.get_mut(*i)?,
                (Value::Object(map), segment) => map.get_mut(&segment.key()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Store `value` at `path`.
    ///
    /// Missing containers are created: an array when the next segment is an
    /// index, an object otherwise. A scalar standing where a container is
    /// needed is replaced. Index writes replace an existing entry or extend
    /// the array by one. A write that would leave a gap in an array is
    /// ignored and returns `false`.
    pub fn set(&mut self, path: &Path, value: Value) -> bool {
        if !self.is_contiguous(path) {
            warn!(path = %path, "ignoring write past the end of an array");
            return false;
        }
        let mut current = &mut self.root;
        for segment in path.segments() {
            current = slot(current, segment);
        }
        *current = value;
        true
    }

    /// Every index in `path` is at most the length of its array
    fn is_contiguous(&self, path: &Path) -> bool {
        let mut current = Some(&self.root);
        for segment in path.segments() {
            if let Segment::Index(i) = segment {
                let len = match current {
                    Some(Value::Array(items)) => items.len(),
                    _ => 0,
                };
                if *i > len {
                    return false;
                }
            }
            current = current.and_then(|c| step(c, segment));
        }
        true
    }

    /// Remove and return the value at `path`
    pub fn remove(&mut self, path: &Path) -> Option<Value> {
        let last = path.last()?;
        let parent = match path.parent() {
            Some(parent) => self.get_mut(&parent)?,
            None => &mut self.root,
        };
        match (parent, last) {
            (Value::Array(items), Segment::Index(i)) if *i < items.len() => Some(items.remove(*i)),
            (Value::Object(map), segment) => {
                let key = segment.key()?;
                let removed = map.get(&key).cloned();
                map.retain(|k, _| *k != key);
                removed
            }
            _ => None,
        }
    }

    /// Entries of the array at `path`; empty when absent or not an array
    pub fn array_items(&self, path: &Path) -> &[Value] {
        match self.get(path) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Append to the array at `path`, creating it if needed; returns the new index
    pub fn push_array_item(&mut self, path: &Path, value: Value) -> usize {
        match self.get_mut(path) {
            Some(Value::Array(items)) => {
                items.push(value);
                items.len() - 1
            }
            _ => {
                self.set(path, Value::Array(vec![value]));
                0
            }
        }
    }

    /// Remove entry `index` of the array at `path`, shifting later entries down
    pub fn remove_array_item(&mut self, path: &Path, index: usize) -> Option<Value> {
        match self.get_mut(path) {
            Some(Value::Array(items)) if index < items.len() => Some(items.remove(index)),
            _ => None,
        }
    }

    /// No value stored at all
    pub fn is_empty(&self) -> bool {
        match &self.root {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    /// At least one non-empty scalar somewhere in the store
    pub fn has_data(&self) -> bool {
        has_scalar(&self.root)
    }

    /// Drop all values
    pub fn clear(&mut self) {
        self.root = Value::Object(Map::new());
    }
}

impl From<ValueStore> for Value {
    fn from(store: ValueStore) -> Self {
        store.root
    }
}

/// A field counts as empty when absent, null, `""` or an empty array
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Text of a scalar leaf: strings as is, numbers and booleans rendered.
/// Containers and null have no text.
pub fn leaf_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        _ => None,
    }
}

fn step<'v>(current: &'v Value, segment: &Segment) -> Option<&'v Value> {
    match (current, segment) {
        (Value::Array(items), Segment::Index(i)) => items.get(*i),
        (Value::Object(map), Segment::Name(name)) => map.get(name),
        (Value::Object(map), Segment::Attr(name)) => map.get(&format!("@{}", name)),
        _ => None,
    }
}

/// Child slot for `segment`, turning `container` into the right kind first
fn slot<'v>(container: &'v mut Value, segment: &Segment) -> &'v mut Value {
    match segment {
        Segment::Index(i) => {
            if !container.is_array() {
                *container = Value::Array(Vec::new());
            }
            match container {
                Value::Array(items) => {
                    if items.len() == *i {
                        items.push(Value::Null);
                    }
                    &mut items[*i]
                }
                _ => unreachable!("container was just made an array"),
            }
        }
        Segment::Name(_) | Segment::Attr(_) => {
            if !container.is_object() {
                *container = Value::Object(Map::new());
            }
            match (container, segment.key()) {
                (Value::Object(map), Some(key)) => map.entry(key).or_insert(Value::Null),
                _ => unreachable!("container was just made an object"),
            }
        }
    }
}

fn has_scalar(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
        Value::Array(items) => items.iter().any(has_scalar),
        Value::Object(map) => map.values().any(has_scalar),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
