//! Emit criteria and listener options.
//!
//! Every public entry point accepts either a bare event name or one of the
//! structures below; conversion happens once, at the boundary.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::definition::offending_field;
use crate::error::{EventError, EventResult};
use crate::listener::Context;
use crate::tags::{TagFilter, Tags, maybe_one_or_many};

/// Describes one emitted update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitCriteria {
    /// Event name.
    pub name: String,
    /// Channel the update is published on.
    pub channel: Option<String>,
    /// Tags attached to the update.
    pub tags: Option<Tags>,
}

impl EmitCriteria {
    /// Criteria naming only the event.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Publish on a channel.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Attach tags (a single tag, a list, or a map).
    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<Tags>) -> Self {
        self.tags = Some(tags.into());
        self
    }
}

impl From<&str> for EmitCriteria {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EmitCriteria {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for EmitCriteria {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}

/// Subscription criteria and per-listener overrides.
///
/// `clone`, `spread` and `tags` left as `None` fall back to the event
/// definition's flags.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerOptions {
    /// Event name.
    pub name: String,
    /// Only receive updates published on one of these channels.
    #[serde(default, deserialize_with = "maybe_one_or_many")]
    pub channels: Option<Vec<String>>,
    /// Override the event's `clone` flag.
    #[serde(default)]
    pub clone: Option<bool>,
    /// Override the event's `spread` flag.
    #[serde(default)]
    pub spread: Option<bool>,
    /// Override the event's `tags` flag.
    #[serde(default)]
    pub tags: Option<bool>,
    /// Number of invocations after which the listener is removed.
    #[serde(default)]
    pub count: Option<u32>,
    /// Only receive updates whose tags pass this filter.
    #[serde(default)]
    pub filter: Option<TagFilter>,
    /// Value exposed to the listener through [`Invocation::context`](crate::Invocation::context).
    #[serde(skip)]
    pub context: Option<Context>,
}

impl ListenerOptions {
    /// Options naming only the event.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Subscribe to the given channels only.
    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = Some(channels.into_iter().map(Into::into).collect());
        self
    }

    /// Override the event's `clone` flag.
    #[must_use]
    pub fn with_clone(mut self, clone: bool) -> Self {
        self.clone = Some(clone);
        self
    }

    /// Override the event's `spread` flag.
    #[must_use]
    pub fn with_spread(mut self, spread: bool) -> Self {
        self.spread = Some(spread);
        self
    }

    /// Override the event's `tags` flag.
    #[must_use]
    pub fn with_tags(mut self, tags: bool) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Remove the listener after `count` invocations.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Filter updates by tag (a single tag, a list, or a [`TagFilter`]).
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<TagFilter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Bind a context value to the listener.
    #[must_use]
    pub fn with_context<T>(mut self, context: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.context = Some(Arc::new(context));
        self
    }

    /// Bind an already shared context value to the listener.
    #[must_use]
    pub fn with_shared_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Parse options from JSON.
    ///
    /// A bare string is treated as `{ "name": <string> }`. A context cannot
    /// be expressed in JSON; attach one afterwards with
    /// [`with_context`](Self::with_context).
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidListenerOptions`] for unknown properties,
    /// wrong types or a negative count.
    pub fn from_json(value: Value) -> EventResult<Self> {
        if let Value::String(name) = value {
            return Ok(Self::new(name));
        }

        serde_json::from_value(value)
            .map_err(|e| EventError::invalid_listener(offending_field(&e), e.to_string()))
    }
}

impl fmt::Debug for ListenerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerOptions")
            .field("name", &self.name)
            .field("channels", &self.channels)
            .field("clone", &self.clone)
            .field("spread", &self.spread)
            .field("tags", &self.tags)
            .field("count", &self.count)
            .field("filter", &self.filter)
            .field("context", &self.context.is_some())
            .finish()
    }
}

impl From<&str> for ListenerOptions {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ListenerOptions {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for ListenerOptions {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}
