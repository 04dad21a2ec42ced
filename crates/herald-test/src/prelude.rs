//! Prelude module - commonly used types for convenient import.
//!
//! Use `use herald_test::prelude::*;` to import all essential types.

pub use crate::fixtures::{
    CountingPayload, channel_event, counting_payload, spread_event, tagged_event, test_event,
};
pub use crate::harness::{setup_test_logging, setup_test_logging_default};
pub use crate::mocks::{failing_listener, noop_listener, panicking_listener, returning_listener};
pub use crate::recorder::{Call, Recorder};

pub use herald_events::prelude::*;
