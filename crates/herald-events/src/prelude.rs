//! Prelude module - commonly used types for convenient import.
//!
//! Use `use herald_events::prelude::*;` to import all essential types.

// Errors
pub use crate::{EventError, EventResult, ListenerError};

// Emitter
pub use crate::{Emitter, RegisterOptions};

// Definitions and criteria
pub use crate::{EmitCriteria, EventDefinition, ListenerOptions, TagFilter, Tags};

// Listeners and results
pub use crate::{Arguments, Deferred, Invocation, Listener, Outcome, Payload, Settled};
