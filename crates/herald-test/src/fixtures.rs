//! Test fixtures for common definitions and payloads.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use herald_events::{EventDefinition, Payload};
use serde_json::Value;

/// A plain event with no flags.
#[must_use]
pub fn test_event(name: &str) -> EventDefinition {
    EventDefinition::new(name)
}

/// An event whose array payloads are spread into positional arguments.
#[must_use]
pub fn spread_event(name: &str) -> EventDefinition {
    EventDefinition::new(name).with_spread(true)
}

/// An event that appends the update's tags to the arguments.
#[must_use]
pub fn tagged_event(name: &str) -> EventDefinition {
    EventDefinition::new(name).with_tags(true)
}

/// An event restricted to `channels`.
#[must_use]
pub fn channel_event(name: &str, channels: &[&str]) -> EventDefinition {
    EventDefinition::new(name).with_channels(channels.iter().copied())
}

/// Counts how many times a lazy payload was generated.
#[derive(Debug, Clone, Default)]
pub struct CountingPayload {
    calls: Arc<AtomicUsize>,
}

impl CountingPayload {
    /// Number of times the generator has run.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A lazy payload producing `value`, plus a handle counting its generations.
#[must_use]
pub fn counting_payload(value: Value) -> (Payload, CountingPayload) {
    let counter = CountingPayload::default();
    let calls = Arc::clone(&counter.calls);
    let payload = Payload::lazy(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        value
    });
    (payload, counter)
}
