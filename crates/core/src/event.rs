//! Event record: an ordered field map with reserved metadata fields.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Reserved field holding the event's tag sequence.
pub const FIELD_TAGS: &str = "tags";
/// Reserved field holding the creation timestamp in epoch milliseconds.
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// Reserved field holding the event type.
pub const FIELD_TYPE: &str = "type";
/// Reserved field holding the emitting source name.
pub const FIELD_SOURCE: &str = "source";

/// A structured record flowing through the pipeline.
///
/// Fields keep insertion order. Events are immutable inputs to the
/// evaluators; callers clone-and-mutate before re-emitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Event {
    fields: IndexMap<String, Value>,
}

impl Event {
    /// Create an event stamped with `type`, `source`, and the current time.
    pub fn new(event_type: &str, source: &str) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(FIELD_TYPE.to_string(), Value::from(event_type));
        fields.insert(FIELD_SOURCE.to_string(), Value::from(source));
        fields.insert(
            FIELD_TIMESTAMP.to_string(),
            Value::Number(Utc::now().timestamp_millis() as f64),
        );
        Self { fields }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Append a tag to the reserved `tags` field, creating it if needed.
    pub fn add_tag(&mut self, tag: &str) {
        match self.fields.get_mut(FIELD_TAGS) {
            Some(Value::Array(items)) => items.push(Value::from(tag)),
            _ => {
                self.fields
                    .insert(FIELD_TAGS.to_string(), Value::Array(vec![Value::from(tag)]));
            }
        }
    }

    /// The event's tag sequence.
    ///
    /// `None` when the `tags` field is absent or not an array; non-string
    /// elements are skipped.
    pub fn tags(&self) -> Option<Vec<&str>> {
        match self.fields.get(FIELD_TAGS) {
            Some(Value::Array(items)) => {
                Some(items.iter().filter_map(Value::as_str).collect())
            }
            _ => None,
        }
    }

    /// Creation timestamp in epoch milliseconds, if stamped.
    pub fn timestamp(&self) -> Option<i64> {
        self.field(FIELD_TIMESTAMP)
            .and_then(Value::as_f64)
            .map(|n| n as i64)
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
