//! The dispatch pass shared by `emit` and `gauge`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::criteria::EmitCriteria;
use crate::definition::EventDefinition;
use crate::error::{EventError, EventResult, ListenerError};
use crate::handler::{Claim, HandlerRecord};
use crate::listener::{Arguments, Invocation, Outcome};
use crate::payload::{Payload, Resolved};
use crate::registry::{EventEntry, EventRegistry, HandlerList};
use crate::tags::Tags;

/// The outcome of one listener in a [`gauge`](crate::Emitter::gauge) pass.
#[derive(Debug, Clone)]
pub enum Settled {
    /// The listener returned a value.
    Fulfilled(Value),
    /// The listener failed.
    Rejected(ListenerError),
}

impl Settled {
    /// Whether the listener succeeded.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Whether the listener failed.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The returned value, if the listener succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Fulfilled(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    /// The error, if the listener failed.
    #[must_use]
    pub fn error(&self) -> Option<&ListenerError> {
        match self {
            Self::Fulfilled(_) => None,
            Self::Rejected(error) => Some(error),
        }
    }

    /// Convert into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the listener's error if it failed.
    pub fn into_result(self) -> Result<Value, ListenerError> {
        match self {
            Self::Fulfilled(value) => Ok(value),
            Self::Rejected(error) => Err(error),
        }
    }
}

impl From<Result<Value, ListenerError>> for Settled {
    fn from(result: Result<Value, ListenerError>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled(value),
            Err(error) => Self::Rejected(error),
        }
    }
}

/// A validated publish request bound to a snapshot of its event's handlers.
pub(crate) struct Dispatch {
    entry: Arc<EventEntry>,
    handlers: HandlerList,
    channel: Option<String>,
    criteria_tags: Option<Tags>,
    tag_arg: Option<Arc<Value>>,
    data: Resolved,
    spread_shared: Option<Vec<Arc<Value>>>,
}

impl Dispatch {
    /// Resolve and check a publish request.
    ///
    /// Returns `None` when the event has no handlers, before the channel or
    /// the payload shape are looked at.
    pub(crate) fn prepare(
        registry: &EventRegistry,
        criteria: EmitCriteria,
        payload: Payload,
    ) -> EventResult<Option<Self>> {
        if criteria.name.is_empty() {
            return Err(EventError::MissingEventName);
        }

        let entry = registry.entry(&criteria.name)?;
        let handlers = entry.snapshot();
        if handlers.is_empty() {
            trace!(event = %criteria.name, "No listeners, nothing to dispatch");
            return Ok(None);
        }

        if let Some(channel) = &criteria.channel
            && !entry.allows_channel(channel)
        {
            return Err(EventError::UnknownChannel {
                event: criteria.name,
                channel: channel.clone(),
            });
        }

        if entry.definition().spread && !payload.is_spreadable() {
            return Err(EventError::SpreadDataMustBeArray {
                event: criteria.name,
            });
        }

        let tag_arg = criteria.tags.as_ref().map(|tags| Arc::new(tags.to_value()));

        Ok(Some(Self {
            entry,
            handlers,
            channel: criteria.channel,
            criteria_tags: criteria.tags,
            tag_arg,
            data: Resolved::new(payload),
            spread_shared: None,
        }))
    }

    pub(crate) fn event(&self) -> &Arc<str> {
        self.entry.name()
    }

    /// Invoke every matching handler in the snapshot, in registration order.
    pub(crate) fn run<F>(mut self, mut on_outcome: F)
    where
        F: FnMut(Outcome),
    {
        let handlers = Arc::clone(&self.handlers);
        trace!(
            event = %self.entry.name(),
            channel = ?self.channel,
            handlers = handlers.len(),
            "Dispatching"
        );

        for handler in handlers.iter() {
            if !handler.accepts_channel(self.channel.as_deref()) {
                trace!(event = %self.entry.name(), "Skipping handler: channel mismatch");
                continue;
            }
            if !handler.accepts_tags(self.criteria_tags.as_ref()) {
                trace!(event = %self.entry.name(), "Skipping handler: tag filter mismatch");
                continue;
            }

            match handler.claim() {
                Claim::Unlimited | Claim::Granted { last: false } => {},
                Claim::Granted { last: true } => {
                    if self.entry.remove(handler) {
                        debug!(event = %self.entry.name(), "Listener count exhausted, removed");
                    }
                },
                Claim::Exhausted => continue,
            }

            let args = self.arguments_for(handler);
            let invocation =
                Invocation::new(Arc::clone(self.entry.name()), args, handler.context.clone());
            on_outcome(handler.listener.call(invocation));
        }
    }

    fn arguments_for(&mut self, handler: &HandlerRecord) -> Arguments {
        let definition: &EventDefinition = self.entry.definition();
        let clone = handler.clone_for(definition);
        let spread = handler.spread_for(definition);
        let tags = handler.tags_for(definition);

        let data = self.data.get();
        let mut args = match (spread, data.as_array()) {
            (true, Some(items)) if clone => items.iter().cloned().map(Arc::new).collect(),
            (true, Some(items)) => self
                .spread_shared
                .get_or_insert_with(|| items.iter().cloned().map(Arc::new).collect())
                .clone(),
            _ if clone => vec![Arc::new(Value::clone(&data))],
            _ => vec![Arc::clone(&data)],
        };

        if tags && let Some(tag_arg) = &self.tag_arg {
            args.push(Arc::clone(tag_arg));
        }

        Arguments::from_shared(args)
    }
}
