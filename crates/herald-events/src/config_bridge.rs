//! Bridge from `herald_config::Config` to emitter types.
//!
//! The config crate has no dependency on the emitter; conversion into
//! event definitions and registration options happens here.

use herald_config::{Config, EventSection};
use tracing::info;

use crate::definition::EventDefinition;
use crate::emitter::Emitter;
use crate::error::EventResult;
use crate::registry::RegisterOptions;

impl From<&EventSection> for EventDefinition {
    fn from(section: &EventSection) -> Self {
        Self {
            name: section.name.clone(),
            channels: section.channels.clone(),
            clone: section.clone,
            spread: section.spread,
            tags: section.tags,
            shared: section.shared,
        }
    }
}

/// Convert the `[[events]]` tables to definitions, in file order.
#[must_use]
pub fn to_event_definitions(cfg: &Config) -> Vec<EventDefinition> {
    cfg.events.iter().map(EventDefinition::from).collect()
}

/// Convert the `[emitter]` table to registration options.
#[must_use]
pub fn to_register_options(cfg: &Config) -> RegisterOptions {
    RegisterOptions {
        validate: cfg.emitter.validate,
    }
}

impl Emitter {
    /// Create an emitter with the events declared in `cfg`.
    ///
    /// # Errors
    ///
    /// Fails like [`Emitter::register_events_with`].
    pub fn from_config(cfg: &Config) -> EventResult<Self> {
        let emitter = Self::new();
        emitter.register_events_with(to_event_definitions(cfg), to_register_options(cfg))?;
        info!(
            events = cfg.events.len(),
            validate = cfg.emitter.validate,
            "Emitter configured"
        );
        Ok(emitter)
    }
}
