//! The public emitter: registration, subscription and publishing.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::criteria::{EmitCriteria, ListenerOptions};
use crate::deferred::{self, Deferred};
use crate::definition::EventDefinition;
use crate::dispatch::{Dispatch, Settled};
use crate::error::{EventError, EventResult, ListenerError};
use crate::handler::HandlerRecord;
use crate::listener::{Arguments, Listener, ListenerFuture, Outcome};
use crate::payload::Payload;
use crate::registry::{EventRegistry, RegisterOptions};
use crate::validate;

/// An in-process publish/subscribe hub for named events.
///
/// Clones share the same registry, so an emitter can be handed to
/// listeners that publish or subscribe re-entrantly.
#[derive(Clone, Default)]
pub struct Emitter {
    registry: Arc<EventRegistry>,
}

impl Emitter {
    /// Create an emitter with no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an emitter and register `definitions` on it.
    ///
    /// # Errors
    ///
    /// Fails like [`register_events`](Self::register_events).
    pub fn with_events<I, D>(definitions: I) -> EventResult<Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<EventDefinition>,
    {
        let emitter = Self::new();
        emitter.register_events(definitions)?;
        Ok(emitter)
    }

    /// Validate definitions without registering them.
    ///
    /// The returned definitions can be registered later with
    /// [`RegisterOptions { validate: false }`](RegisterOptions).
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidEventOptions`] for the first invalid definition.
    pub fn validate<I, D>(definitions: I) -> EventResult<Vec<EventDefinition>>
    where
        I: IntoIterator<Item = D>,
        D: Into<EventDefinition>,
    {
        definitions
            .into_iter()
            .map(|definition| {
                let definition = definition.into();
                validate::event_definition(&definition)?;
                Ok(definition)
            })
            .collect()
    }

    /// Register one event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidEventOptions`] for an invalid definition
    /// and [`EventError::DuplicateEvent`] if the name is taken and neither
    /// definition is shared.
    pub fn register_event(&self, definition: impl Into<EventDefinition>) -> EventResult<&Self> {
        self.registry
            .register(definition.into(), RegisterOptions::default())?;
        Ok(self)
    }

    /// Register several events, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing definition; earlier ones stay registered.
    pub fn register_events<I, D>(&self, definitions: I) -> EventResult<&Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<EventDefinition>,
    {
        self.register_events_with(definitions, RegisterOptions::default())
    }

    /// Register several events with explicit options.
    ///
    /// # Errors
    ///
    /// Stops at the first failing definition; earlier ones stay registered.
    pub fn register_events_with<I, D>(
        &self,
        definitions: I,
        options: RegisterOptions,
    ) -> EventResult<&Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<EventDefinition>,
    {
        for definition in definitions {
            self.registry.register(definition.into(), options)?;
        }
        Ok(self)
    }

    /// Subscribe a listener.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if the event is not registered,
    /// [`EventError::InvalidListenerOptions`] for malformed options and
    /// [`EventError::UnknownEventChannels`] for channels the event does not allow.
    pub fn on(&self, options: impl Into<ListenerOptions>, listener: Listener) -> EventResult<&Self> {
        self.subscribe(options.into(), listener)?;
        Ok(self)
    }

    /// Alias of [`on`](Self::on).
    ///
    /// # Errors
    ///
    /// Fails like [`on`](Self::on).
    pub fn add_listener(
        &self,
        options: impl Into<ListenerOptions>,
        listener: Listener,
    ) -> EventResult<&Self> {
        self.on(options, listener)
    }

    /// Subscribe a listener for a single invocation.
    ///
    /// Any `count` in `options` is replaced by 1.
    ///
    /// # Errors
    ///
    /// Fails like [`on`](Self::on).
    pub fn once(&self, options: impl Into<ListenerOptions>, listener: Listener) -> EventResult<&Self> {
        self.subscribe(options.into().with_count(1), listener)?;
        Ok(self)
    }

    /// Wait for the next matching update.
    ///
    /// The returned [`Deferred`] resolves with the arguments of that update.
    ///
    /// # Errors
    ///
    /// Fails like [`on`](Self::on).
    pub fn wait_once(&self, options: impl Into<ListenerOptions>) -> EventResult<Deferred<Arguments>> {
        let options = options.into().with_count(1);
        let (listener, deferred) = deferred::first_arguments(&options.name);
        self.subscribe(options, listener)?;
        Ok(deferred)
    }

    /// Collect the arguments of the next `count` matching updates.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidListenerOptions`] when `count` is missing
    /// or zero, otherwise fails like [`on`](Self::on).
    pub fn few(&self, options: impl Into<ListenerOptions>) -> EventResult<Deferred<Vec<Arguments>>> {
        let options = options.into();
        let Some(count) = options.count else {
            return Err(EventError::invalid_listener(
                "count",
                "few requires a positive count",
            ));
        };

        let (listener, deferred) = deferred::collected_arguments(&options.name, count);
        self.subscribe(options, listener)?;
        Ok(deferred)
    }

    /// Remove every subscription of `listener` to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if the event is not registered.
    pub fn remove_listener(&self, name: &str, listener: &Listener) -> EventResult<&Self> {
        self.registry.remove_listener(name, listener)?;
        Ok(self)
    }

    /// Alias of [`remove_listener`](Self::remove_listener).
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if the event is not registered.
    pub fn off(&self, name: &str, listener: &Listener) -> EventResult<&Self> {
        self.remove_listener(name, listener)
    }

    /// Remove every subscription to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if the event is not registered.
    pub fn remove_all_listeners(&self, name: &str) -> EventResult<&Self> {
        self.registry.remove_all_listeners(name)?;
        Ok(self)
    }

    /// Whether `name` has at least one subscription.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if the event is not registered.
    pub fn has_listeners(&self, name: &str) -> EventResult<bool> {
        self.registry.has_listeners(name)
    }

    /// Number of subscriptions to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if the event is not registered.
    pub fn listener_count(&self, name: &str) -> EventResult<usize> {
        Ok(self.registry.entry(name)?.len())
    }

    /// The registered definition of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if the event is not registered.
    pub fn definition(&self, name: &str) -> EventResult<EventDefinition> {
        Ok(self.registry.entry(name)?.definition().clone())
    }

    /// Names of all registered events, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Publish an update and invoke every matching listener.
    ///
    /// All matching listeners run even if some fail. Futures returned by
    /// asynchronous listeners are spawned on the current tokio runtime and
    /// not awaited; without a runtime they are dropped.
    ///
    /// # Errors
    ///
    /// Lookup and validation errors are returned before any listener runs.
    /// If listeners fail, the first failure is returned as
    /// [`EventError::ListenerInvocation`] after the pass completes.
    pub fn emit(
        &self,
        criteria: impl Into<EmitCriteria>,
        payload: impl Into<Payload>,
    ) -> EventResult<()> {
        let Some(dispatch) = Dispatch::prepare(&self.registry, criteria.into(), payload.into())?
        else {
            return Ok(());
        };
        let event = Arc::clone(dispatch.event());

        let mut first_error: Option<ListenerError> = None;
        dispatch.run(|outcome| match outcome {
            Outcome::Ready(Ok(_)) => {},
            Outcome::Ready(Err(error)) => {
                if first_error.is_none() {
                    first_error = Some(error);
                } else {
                    warn!(event = %event, error = %error, "Listener failed after an earlier failure");
                }
            },
            Outcome::Pending(future) => spawn_detached(&event, future),
        });

        match first_error {
            Some(source) => {
                warn!(event = %event, error = %source, "Listener failed");
                Err(EventError::ListenerInvocation {
                    event: event.to_string(),
                    source,
                })
            },
            None => Ok(()),
        }
    }

    /// Publish an update and collect every matching listener's outcome.
    ///
    /// Listeners are invoked before this returns; the returned future awaits
    /// the asynchronous ones and yields one [`Settled`] per invoked listener,
    /// in registration order.
    ///
    /// # Errors
    ///
    /// The future yields lookup and validation errors. Listener failures
    /// are reported as [`Settled::Rejected`] instead.
    pub fn gauge(
        &self,
        criteria: impl Into<EmitCriteria>,
        payload: impl Into<Payload>,
    ) -> impl Future<Output = EventResult<Vec<Settled>>> + Send + 'static {
        let pending = self.collect(criteria.into(), payload.into());
        async move {
            let futures = pending?;
            Ok(join_all(futures)
                .await
                .into_iter()
                .map(Settled::from)
                .collect())
        }
    }

    fn collect(&self, criteria: EmitCriteria, payload: Payload) -> EventResult<Vec<ListenerFuture>> {
        let mut futures = Vec::new();
        if let Some(dispatch) = Dispatch::prepare(&self.registry, criteria, payload)? {
            dispatch.run(|outcome| futures.push(outcome.into_future()));
        }
        Ok(futures)
    }

    fn subscribe(&self, options: ListenerOptions, listener: Listener) -> EventResult<()> {
        validate::listener_name(&options.name)?;
        let entry = self.registry.entry(&options.name)?;
        validate::listener_options(&options, entry.definition())?;

        debug!(
            event = %options.name,
            channels = ?options.channels,
            count = ?options.count,
            filtered = options.filter.is_some(),
            "Listener subscribed"
        );
        entry.push(Arc::new(HandlerRecord::new(options, listener)));
        Ok(())
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("events", &self.registry.names())
            .finish()
    }
}

fn spawn_detached(event: &Arc<str>, future: ListenerFuture) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let event = Arc::clone(event);
            handle.spawn(async move {
                if let Err(error) = future.await {
                    warn!(event = %event, error = %error, "Async listener failed");
                }
            });
        },
        Err(_) => {
            warn!(event = %event, "No tokio runtime, async listener dropped");
        },
    }
}
