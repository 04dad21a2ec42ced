//! Event definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EventError, EventResult};
use crate::tags::maybe_one_or_many;

/// Registration flags for an event.
///
/// Definitions are immutable once registered. The `clone`, `spread` and
/// `tags` flags are defaults that individual listeners may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDefinition {
    /// Unique event name.
    pub name: String,
    /// Allowed channels. `None` places no restriction on emitted channels.
    #[serde(
        default,
        deserialize_with = "maybe_one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub channels: Option<Vec<String>>,
    /// Deliver a deep copy of the data to each listener.
    #[serde(default)]
    pub clone: bool,
    /// Deliver array data as separate positional arguments.
    #[serde(default)]
    pub spread: bool,
    /// Append the update's tag map as the last argument.
    #[serde(default)]
    pub tags: bool,
    /// Allow repeated registration of the same name (first definition wins).
    #[serde(default)]
    pub shared: bool,
}

impl EventDefinition {
    /// Create a definition with every flag unset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Restrict the event to the given channels.
    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = Some(channels.into_iter().map(Into::into).collect());
        self
    }

    /// Set the default `clone` flag.
    #[must_use]
    pub fn with_clone(mut self, clone: bool) -> Self {
        self.clone = clone;
        self
    }

    /// Set the default `spread` flag.
    #[must_use]
    pub fn with_spread(mut self, spread: bool) -> Self {
        self.spread = spread;
        self
    }

    /// Set the default `tags` flag.
    #[must_use]
    pub fn with_tags(mut self, tags: bool) -> Self {
        self.tags = tags;
        self
    }

    /// Set the `shared` flag.
    #[must_use]
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Parse a definition from JSON.
    ///
    /// A bare string is treated as `{ "name": <string> }`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidEventOptions`] if the value does not
    /// describe an event (unknown property, wrong type, missing name).
    pub fn from_json(value: Value) -> EventResult<Self> {
        if let Value::String(name) = value {
            return Ok(Self::new(name));
        }

        serde_json::from_value(value)
            .map_err(|e| EventError::invalid_event(offending_field(&e), e.to_string()))
    }
}

impl From<&str> for EventDefinition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventDefinition {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for EventDefinition {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}

/// Best-effort extraction of the field named in a serde error message.
pub(crate) fn offending_field(error: &serde_json::Error) -> String {
    let message = error.to_string();
    message
        .split('`')
        .nth(1)
        .filter(|field| !field.is_empty())
        .map_or_else(|| "options".to_string(), str::to_string)
}
