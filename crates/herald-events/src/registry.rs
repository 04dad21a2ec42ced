//! Event registry: definitions and their live handler lists.
//!
//! Handler lists are copy-on-write. Every mutation builds a new list and
//! swaps it in, so a dispatch pass iterating over a snapshot never observes
//! handlers added or removed while it runs.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use crate::definition::EventDefinition;
use crate::error::{EventError, EventResult};
use crate::handler::HandlerRecord;
use crate::listener::Listener;
use crate::validate;

/// Immutable snapshot of an event's handlers, in registration order.
pub(crate) type HandlerList = Arc<Vec<Arc<HandlerRecord>>>;

/// Options for [`Emitter::register_events_with`](crate::Emitter::register_events_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Run definitions through validation before registering them.
    ///
    /// Only disable this for definitions returned by
    /// [`Emitter::validate`](crate::Emitter::validate).
    pub validate: bool,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// A registered event and its handlers.
pub(crate) struct EventEntry {
    name: Arc<str>,
    definition: EventDefinition,
    channels: Option<BTreeSet<String>>,
    handlers: RwLock<HandlerList>,
}

impl EventEntry {
    fn new(definition: EventDefinition) -> Self {
        Self {
            name: Arc::from(definition.name.as_str()),
            channels: definition
                .channels
                .as_ref()
                .map(|channels| channels.iter().cloned().collect()),
            definition,
            handlers: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn definition(&self) -> &EventDefinition {
        &self.definition
    }

    /// Whether an update may be published on `channel`.
    pub(crate) fn allows_channel(&self, channel: &str) -> bool {
        self.channels
            .as_ref()
            .is_none_or(|channels| channels.contains(channel))
    }

    pub(crate) fn snapshot(&self) -> HandlerList {
        Arc::clone(&read(&self.handlers))
    }

    pub(crate) fn len(&self) -> usize {
        read(&self.handlers).len()
    }

    pub(crate) fn push(&self, handler: Arc<HandlerRecord>) {
        let mut handlers = write(&self.handlers);
        let mut next = Vec::with_capacity(handlers.len().saturating_add(1));
        next.extend(handlers.iter().cloned());
        next.push(handler);
        *handlers = Arc::new(next);
    }

    /// Drop every handler for which `remove` returns true. Returns how many went.
    pub(crate) fn remove_where<F>(&self, remove: F) -> usize
    where
        F: Fn(&HandlerRecord) -> bool,
    {
        let mut handlers = write(&self.handlers);
        let next: Vec<_> = handlers
            .iter()
            .filter(|handler| !remove(handler))
            .cloned()
            .collect();
        let removed = handlers.len().saturating_sub(next.len());
        if removed > 0 {
            *handlers = Arc::new(next);
        }
        removed
    }

    pub(crate) fn remove(&self, handler: &Arc<HandlerRecord>) -> bool {
        self.remove_where(|candidate| std::ptr::eq(candidate, Arc::as_ptr(handler))) > 0
    }

    pub(crate) fn clear(&self) -> usize {
        let mut handlers = write(&self.handlers);
        let removed = handlers.len();
        *handlers = Arc::new(Vec::new());
        removed
    }
}

/// Mapping from event name to its entry.
#[derive(Default)]
pub(crate) struct EventRegistry {
    events: DashMap<String, Arc<EventEntry>>,
}

impl EventRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register one event.
    ///
    /// Re-registering a name succeeds without effect when either the stored
    /// or the incoming definition is shared; the stored definition is kept.
    pub(crate) fn register(
        &self,
        definition: EventDefinition,
        options: RegisterOptions,
    ) -> EventResult<()> {
        if options.validate {
            validate::event_definition(&definition)?;
        }

        match self.events.entry(definition.name.clone()) {
            Entry::Occupied(existing) => {
                if existing.get().definition.shared || definition.shared {
                    debug!(event = %definition.name, "Shared event already registered");
                    Ok(())
                } else {
                    Err(EventError::DuplicateEvent {
                        name: definition.name,
                    })
                }
            },
            Entry::Vacant(slot) => {
                debug!(
                    event = %definition.name,
                    channels = ?definition.channels,
                    clone = definition.clone,
                    spread = definition.spread,
                    tags = definition.tags,
                    "Event registered"
                );
                slot.insert(Arc::new(EventEntry::new(definition)));
                Ok(())
            },
        }
    }

    /// Look up an entry. The returned handle does not hold any map lock.
    pub(crate) fn entry(&self, name: &str) -> EventResult<Arc<EventEntry>> {
        self.events
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EventError::unknown_event(name))
    }

    pub(crate) fn has_listeners(&self, name: &str) -> EventResult<bool> {
        Ok(self.entry(name)?.len() > 0)
    }

    pub(crate) fn remove_all_listeners(&self, name: &str) -> EventResult<usize> {
        let removed = self.entry(name)?.clear();
        debug!(event = %name, removed, "All listeners removed");
        Ok(removed)
    }

    pub(crate) fn remove_listener(&self, name: &str, listener: &Listener) -> EventResult<usize> {
        let removed = self
            .entry(name)?
            .remove_where(|handler| handler.listener.ptr_eq(listener));
        debug!(event = %name, removed, "Listener removed");
        Ok(removed)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| {
        warn!("Handler list read lock poisoned, recovering");
        PoisonError::into_inner(e)
    })
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| {
        warn!("Handler list lock poisoned, recovering");
        PoisonError::into_inner(e)
    })
}
