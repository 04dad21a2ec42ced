//! Subscribed handler records.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::criteria::ListenerOptions;
use crate::definition::EventDefinition;
use crate::listener::{Context, Listener};
use crate::tags::{TagFilter, Tags};

/// Result of claiming one invocation from a handler's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// No count was set.
    Unlimited,
    /// An invocation was granted; `last` is set when it used up the count.
    Granted { last: bool },
    /// The count was already used up by an earlier invocation.
    Exhausted,
}

/// A listener plus its matching rules and delivery overrides.
pub(crate) struct HandlerRecord {
    pub(crate) listener: Listener,
    pub(crate) context: Option<Context>,
    channels: Option<BTreeSet<String>>,
    filter: Option<TagFilter>,
    clone: Option<bool>,
    spread: Option<bool>,
    tags: Option<bool>,
    remaining: Option<AtomicU32>,
}

impl HandlerRecord {
    pub(crate) fn new(options: ListenerOptions, listener: Listener) -> Self {
        Self {
            listener,
            context: options.context,
            channels: options.channels.map(|channels| channels.into_iter().collect()),
            filter: options.filter,
            clone: options.clone,
            spread: options.spread,
            tags: options.tags,
            remaining: options.count.map(AtomicU32::new),
        }
    }

    /// A handler with channels only hears updates published on one of them.
    pub(crate) fn accepts_channel(&self, channel: Option<&str>) -> bool {
        match (&self.channels, channel) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(channels), Some(channel)) => channels.contains(channel),
        }
    }

    pub(crate) fn accepts_tags(&self, tags: Option<&Tags>) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter.matches(tags))
    }

    /// Take one invocation from the remaining count.
    pub(crate) fn claim(&self) -> Claim {
        let Some(remaining) = &self.remaining else {
            return Claim::Unlimited;
        };

        match remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1)) {
            Ok(previous) => Claim::Granted {
                last: previous == 1,
            },
            Err(_) => Claim::Exhausted,
        }
    }

    pub(crate) fn clone_for(&self, definition: &EventDefinition) -> bool {
        self.clone.unwrap_or(definition.clone)
    }

    pub(crate) fn spread_for(&self, definition: &EventDefinition) -> bool {
        self.spread.unwrap_or(definition.spread)
    }

    pub(crate) fn tags_for(&self, definition: &EventDefinition) -> bool {
        self.tags.unwrap_or(definition.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(options: ListenerOptions) -> HandlerRecord {
        HandlerRecord::new(options, Listener::new(|_inv| ()))
    }

    #[test]
    fn test_claim_unlimited() {
        let handler = record(ListenerOptions::new("test"));
        assert_eq!(handler.claim(), Claim::Unlimited);
        assert_eq!(handler.claim(), Claim::Unlimited);
    }

    #[test]
    fn test_claim_counts_down() {
        let handler = record(ListenerOptions::new("test").with_count(2));
        assert_eq!(handler.claim(), Claim::Granted { last: false });
        assert_eq!(handler.claim(), Claim::Granted { last: true });
        assert_eq!(handler.claim(), Claim::Exhausted);
    }

    #[test]
    fn test_channel_matching() {
        let open = record(ListenerOptions::new("test"));
        assert!(open.accepts_channel(None));
        assert!(open.accepts_channel(Some("a")));

        let restricted = record(ListenerOptions::new("test").with_channels(["a", "b"]));
        assert!(!restricted.accepts_channel(None));
        assert!(restricted.accepts_channel(Some("b")));
        assert!(!restricted.accepts_channel(Some("c")));
    }

    #[test]
    fn test_flag_precedence() {
        let definition = EventDefinition::new("test").with_clone(true);

        let inherits = record(ListenerOptions::new("test"));
        assert!(inherits.clone_for(&definition));
        assert!(!inherits.spread_for(&definition));

        let overrides = record(ListenerOptions::new("test").with_clone(false).with_spread(true));
        assert!(!overrides.clone_for(&definition));
        assert!(overrides.spread_for(&definition));
        assert!(!overrides.tags_for(&definition));
    }
}
