//! Herald Events - in-process publish/subscribe for named events.
//!
//! This crate provides:
//! - An event registry with per-event delivery flags (clone, spread, tags, channels)
//! - Listener subscription with channel restrictions, tag filters and invocation counts
//! - Synchronous fan-out (`emit`) and outcome-collecting fan-out (`gauge`)
//!
//! # Example
//!
//! ```rust
//! use herald_events::{EmitCriteria, Emitter, EventDefinition, Listener};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), herald_events::EventError> {
//! let emitter = Emitter::new();
//! emitter.register_event(EventDefinition::new("job").with_spread(true).with_tags(true))?;
//!
//! emitter.on(
//!     "job",
//!     Listener::new(|inv| {
//!         assert_eq!(inv.args().len(), 3);
//!         assert_eq!(inv.arg(2), Some(&json!({ "urgent": true })));
//!     }),
//! )?;
//!
//! emitter.emit(EmitCriteria::new("job").with_tags("urgent"), json!([1, 2]))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Dispatch model
//!
//! Each publish takes a snapshot of the event's handlers before invoking any
//! of them. Listeners may subscribe, unsubscribe or publish from inside a
//! callback; such changes apply to later publishes only. No lock is held
//! while a listener runs.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;
pub mod validate;

/// Bridge from configuration types.
#[cfg(feature = "config")]
pub mod config_bridge;

mod criteria;
mod deferred;
mod definition;
mod dispatch;
mod emitter;
mod error;
mod handler;
mod listener;
mod payload;
mod registry;
mod tags;

pub use criteria::{EmitCriteria, ListenerOptions};
pub use deferred::Deferred;
pub use definition::EventDefinition;
pub use dispatch::Settled;
pub use emitter::Emitter;
pub use error::{EventError, EventResult, ListenerError};
pub use listener::{Arguments, Context, IntoOutcome, Invocation, Listener, ListenerFuture, Outcome};
pub use payload::Payload;
pub use registry::RegisterOptions;
pub use tags::{TagFilter, Tags};
