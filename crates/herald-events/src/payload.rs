//! Emitted data, including lazily generated payloads.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

type Generator = Box<dyn FnOnce() -> Value + Send>;

/// Data passed to [`Emitter::emit`](crate::Emitter::emit) and
/// [`Emitter::gauge`](crate::Emitter::gauge).
pub enum Payload {
    /// A concrete value.
    Value(Value),
    /// A generator, called at most once per emit and only if some listener
    /// matches.
    Lazy(Generator),
}

impl Payload {
    /// Defer building the data until the first matching listener.
    pub fn lazy<F>(generator: F) -> Self
    where
        F: FnOnce() -> Value + Send + 'static,
    {
        Self::Lazy(Box::new(generator))
    }

    /// Whether the payload may be emitted on a spread event.
    pub(crate) fn is_spreadable(&self) -> bool {
        matches!(self, Self::Lazy(_) | Self::Value(Value::Array(_)))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::Value(Value::Null)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<()> for Payload {
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy"),
        }
    }
}

/// Resolves a payload once and hands out shared handles afterwards.
pub(crate) struct Resolved {
    pending: Option<Payload>,
    value: Option<Arc<Value>>,
}

impl Resolved {
    pub(crate) fn new(payload: Payload) -> Self {
        Self {
            pending: Some(payload),
            value: None,
        }
    }

    pub(crate) fn get(&mut self) -> Arc<Value> {
        if let Some(value) = &self.value {
            return Arc::clone(value);
        }

        let value = Arc::new(match self.pending.take() {
            Some(Payload::Value(value)) => value,
            Some(Payload::Lazy(generator)) => generator(),
            None => Value::Null,
        });
        self.value = Some(Arc::clone(&value));
        value
    }
}
