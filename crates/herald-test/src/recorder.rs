//! Ordered capture of listener invocations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use herald_events::{Arguments, Invocation, Listener};
use serde_json::Value;

/// One recorded listener call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Label of the listener that was called.
    pub label: String,
    /// Event the call was delivered for.
    pub event: String,
    /// Arguments as received, sharing allocations with the emitter.
    pub args: Arguments,
}

impl Call {
    /// Owned copies of the arguments.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.args.to_values()
    }
}

/// Records calls from any number of labelled listeners into one ordered log.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that records its call and returns `null`.
    #[must_use]
    pub fn listener(&self, label: impl Into<String>) -> Listener {
        let recorder = self.clone();
        let label = label.into();
        Listener::new(move |invocation: &Invocation| recorder.record(&label, invocation))
    }

    /// A listener that records its call and then fails with `message`.
    #[must_use]
    pub fn failing(&self, label: impl Into<String>, message: impl Into<String>) -> Listener {
        let recorder = self.clone();
        let label = label.into();
        let message = message.into();
        Listener::new(move |invocation: &Invocation| -> anyhow::Result<()> {
            recorder.record(&label, invocation);
            Err(anyhow::anyhow!("{message}"))
        })
    }

    /// A listener that records its call and returns `value`.
    #[must_use]
    pub fn returning(&self, label: impl Into<String>, value: Value) -> Listener {
        let recorder = self.clone();
        let label = label.into();
        Listener::new(move |invocation: &Invocation| {
            recorder.record(&label, invocation);
            value.clone()
        })
    }

    /// Append a call to the log.
    pub fn record(&self, label: &str, invocation: &Invocation) {
        self.lock().push(Call {
            label: label.to_owned(),
            event: invocation.event().to_owned(),
            args: invocation.args().clone(),
        });
    }

    /// Snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    /// Number of calls so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Labels of every call, in call order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.lock().iter().map(|call| call.label.clone()).collect()
    }

    /// Owned argument values of the call at `index`.
    #[must_use]
    pub fn args(&self, index: usize) -> Option<Vec<Value>> {
        self.lock().get(index).map(Call::values)
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
