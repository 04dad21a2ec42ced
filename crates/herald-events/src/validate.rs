//! Validation of event definitions and listener options.
//!
//! Typed options already rule out most schema violations; the checks here
//! cover what the types cannot express: non-empty names, non-empty and
//! duplicate-free channel and tag lists, positive counts, and listener
//! channels that stay within the event's allowed set.

use std::collections::HashSet;

use crate::criteria::ListenerOptions;
use crate::definition::EventDefinition;
use crate::error::{EventError, EventResult};

/// Check an event definition.
///
/// # Errors
///
/// Returns [`EventError::InvalidEventOptions`] naming the offending field.
pub fn event_definition(definition: &EventDefinition) -> EventResult<()> {
    if definition.name.is_empty() {
        return Err(EventError::invalid_event(
            "name",
            "event name must be a non-empty string",
        ));
    }

    if let Some(channels) = &definition.channels {
        check_unique_list(channels, "channel").map_err(|message| {
            EventError::invalid_event("channels", format!("{message} in event {}", definition.name))
        })?;
    }

    Ok(())
}

/// Check listener options against the definition of the event they target.
///
/// # Errors
///
/// Returns [`EventError::InvalidListenerOptions`] for malformed options and
/// [`EventError::UnknownEventChannels`] when the options ask for channels
/// the event does not allow.
pub fn listener_options(options: &ListenerOptions, definition: &EventDefinition) -> EventResult<()> {
    listener_name(&options.name)?;

    if options.count == Some(0) {
        return Err(EventError::invalid_listener(
            "count",
            "count must be a positive integer",
        ));
    }

    if let Some(filter) = &options.filter {
        check_unique_list(filter.tags(), "tag")
            .map_err(|message| EventError::invalid_listener("filter.tags", message))?;
    }

    let Some(channels) = &options.channels else {
        return Ok(());
    };

    check_unique_list(channels, "channel")
        .map_err(|message| EventError::invalid_listener("channels", message))?;

    if let Some(allowed) = &definition.channels {
        let unknown: Vec<String> = channels
            .iter()
            .filter(|channel| !allowed.contains(channel))
            .cloned()
            .collect();

        if !unknown.is_empty() {
            return Err(EventError::UnknownEventChannels {
                event: definition.name.clone(),
                channels: unknown,
            });
        }
    }

    Ok(())
}

/// Subscriptions must name their event before it can be looked up.
pub(crate) fn listener_name(name: &str) -> EventResult<()> {
    if name.is_empty() {
        return Err(EventError::invalid_listener(
            "name",
            "event name must be a non-empty string",
        ));
    }
    Ok(())
}

fn check_unique_list(items: &[String], kind: &str) -> Result<(), String> {
    if items.is_empty() {
        return Err(format!("at least one {kind} is required"));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.is_empty() {
            return Err(format!("empty {kind} name"));
        }
        if !seen.insert(item.as_str()) {
            return Err(format!("duplicate {kind} {item}"));
        }
    }

    Ok(())
}
