//! Listener mocks.

use herald_events::{Invocation, Listener};
use serde_json::Value;

/// A listener that does nothing.
#[must_use]
pub fn noop_listener() -> Listener {
    Listener::new(|_: &Invocation| {})
}

/// A listener that always returns `value`.
#[must_use]
pub fn returning_listener(value: Value) -> Listener {
    Listener::new(move |_: &Invocation| value.clone())
}

/// A listener that always fails with `message`.
#[must_use]
pub fn failing_listener(message: impl Into<String>) -> Listener {
    let message = message.into();
    Listener::new(move |_: &Invocation| -> anyhow::Result<()> {
        Err(anyhow::anyhow!("{message}"))
    })
}

/// A listener that panics with `message`.
#[must_use]
pub fn panicking_listener(message: impl Into<String>) -> Listener {
    let message = message.into();
    Listener::new::<_, ()>(move |_: &Invocation| panic!("{message}"))
}
