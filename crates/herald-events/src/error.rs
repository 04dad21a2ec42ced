//! Error types for event registration, subscription and dispatch.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while registering, subscribing to or emitting events.
#[derive(Debug, Error)]
pub enum EventError {
    /// The operation referenced an event name that was never registered.
    #[error("unknown event: {name}")]
    UnknownEvent {
        /// The unregistered event name.
        name: String,
    },

    /// The event was registered twice and neither registration was shared.
    #[error("event {name} already registered")]
    DuplicateEvent {
        /// The duplicated event name.
        name: String,
    },

    /// An event definition failed validation.
    #[error("invalid event options ({field}): {message}")]
    InvalidEventOptions {
        /// The offending field.
        field: String,
        /// Human-readable description of the violation.
        message: String,
    },

    /// Listener options failed validation.
    #[error("invalid listener options ({field}): {message}")]
    InvalidListenerOptions {
        /// The offending field.
        field: String,
        /// Human-readable description of the violation.
        message: String,
    },

    /// Emit criteria carried no event name.
    #[error("missing event name")]
    MissingEventName,

    /// An update was emitted on a channel the event does not allow.
    #[error("unknown channel {channel} for event {event}")]
    UnknownChannel {
        /// The event name.
        event: String,
        /// The rejected channel.
        channel: String,
    },

    /// A subscription asked for channels the event does not allow.
    #[error("unknown event channels {} for event {event}", .channels.join(", "))]
    UnknownEventChannels {
        /// The event name.
        event: String,
        /// Every requested channel missing from the event's allowed set.
        channels: Vec<String>,
    },

    /// A spread event was emitted with data that is neither an array nor a generator.
    #[error("data must be an array for spread event {event}")]
    SpreadDataMustBeArray {
        /// The event name.
        event: String,
    },

    /// A listener failed while handling an update.
    #[error("listener for event {event} failed: {source}")]
    ListenerInvocation {
        /// The event name.
        event: String,
        /// The listener's error.
        #[source]
        source: ListenerError,
    },

    /// A pending `wait_once`/`few` subscription was removed before it resolved.
    #[error("subscription to event {event} was dropped before it resolved")]
    Abandoned {
        /// The event name.
        event: String,
    },
}

impl EventError {
    pub(crate) fn invalid_event(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEventOptions {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_listener(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidListenerOptions {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn unknown_event(name: impl Into<String>) -> Self {
        Self::UnknownEvent { name: name.into() }
    }

    /// The listener error carried by a [`EventError::ListenerInvocation`].
    #[must_use]
    pub fn listener_error(&self) -> Option<&ListenerError> {
        match self {
            Self::ListenerInvocation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for event operations.
pub type EventResult<T> = Result<T, EventError>;

/// An error raised by a listener.
///
/// Wraps an [`anyhow::Error`] behind an `Arc` so the same failure can be
/// reported by [`EventError::ListenerInvocation`] and by settled results
/// without being re-created.
#[derive(Clone)]
pub struct ListenerError(Arc<anyhow::Error>);

impl ListenerError {
    /// Wrap any error convertible into [`anyhow::Error`].
    pub fn new<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self(Arc::new(error.into()))
    }

    /// Create an error from a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::msg(message)))
    }

    /// Attempt to downcast the underlying error to a concrete type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// Whether both handles refer to the same failure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<anyhow::Error> for ListenerError {
    fn from(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }
}

impl fmt::Debug for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&**self.0)
    }
}
