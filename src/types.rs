//! Core types for the event hub.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field name every event carries.
pub const EVENT_TYPE_FIELD: &str = "eventType";

/// Unique identifier for a subscription.
///
/// Assigned at registration from a monotonic counter, never reused while the
/// subscription is registered. Used only for removal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Captured position in a workflow's request sequence.
///
/// Compared against the owning [`RequestGuard`](crate::RequestGuard)'s
/// current epoch to decide whether a late response may still be applied.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Epoch(pub u64);

impl fmt::Debug for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch({})", self.0)
    }
}

/// An event delivered through the hub.
///
/// An open mapping from field names to JSON values, always containing
/// `eventType`. Events are transient: constructed at send time, passed by
/// reference to matching listeners, never stored.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    /// Build an event by merging `data` onto `{eventType}`.
    ///
    /// The explicit `event_type` argument always wins over a same-named
    /// field in `data`. Non-object `data` contributes nothing.
    pub fn new(event_type: &str, data: Value) -> Self {
        let mut fields = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.insert(
            EVENT_TYPE_FIELD.to_string(),
            Value::String(event_type.to_string()),
        );
        Event { fields }
    }

    /// The event type. Present by construction.
    pub fn event_type(&self) -> &str {
        self.fields
            .get(EVENT_TYPE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All fields, including `eventType`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Event")
            .field(&Value::Object(self.fields.clone()))
            .finish()
    }
}

/// Exact-match delivery constraint for a subscription.
///
/// An event matches iff every filter field is present in the event with a
/// strictly equal value (missing event field is a non-match, no coercion,
/// no patterns). The empty filter matches every event.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    required: Map<String, Value>,
}

impl Filter {
    /// The empty filter, matching every event.
    pub fn any() -> Self {
        Filter::default()
    }

    /// Shorthand for `{eventType: event_type}`.
    pub fn event_type(event_type: &str) -> Self {
        Filter::any().field(EVENT_TYPE_FIELD, event_type)
    }

    /// Add a required field, replacing any prior constraint on it.
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.required.insert(name.to_string(), value.into());
        self
    }

    /// Parse a JSON-shaped filter: a string is shorthand for
    /// `{eventType: s}`, an object is taken field-by-field.
    pub fn from_value(value: Value) -> crate::error::Result<Self> {
        match value {
            Value::String(s) => Ok(Filter::event_type(&s)),
            Value::Object(required) => Ok(Filter { required }),
            other => Err(crate::error::HubError::InvalidFilter(format!(
                "expected string or object, got {other}"
            ))),
        }
    }

    /// True iff every required field is present in `event` with an equal value.
    pub fn matches(&self, event: &Event) -> bool {
        self.required
            .iter()
            .all(|(name, value)| event.get(name) == Some(value))
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

impl From<&str> for Filter {
    fn from(event_type: &str) -> Self {
        Filter::event_type(event_type)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter")
            .field(&Value::Object(self.required.clone()))
            .finish()
    }
}
