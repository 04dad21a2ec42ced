//! Shared test utilities for Herald.
//!
//! This crate provides:
//! - [`Recorder`] for capturing listener invocations in order
//! - Listener mocks that fail or panic on demand
//! - Event definition fixtures and a counting lazy payload
//! - Test logging setup
//!
//! # Usage
//!
//! ```rust,ignore
//! use herald_test::prelude::*;
//!
//! #[test]
//! fn records_calls() {
//!     let emitter = Emitter::with_events([test_event("ping")]).unwrap();
//!     let recorder = Recorder::new();
//!     emitter.on("ping", recorder.listener("a")).unwrap();
//!     emitter.emit("ping", serde_json::json!(1)).unwrap();
//!     assert_eq!(recorder.labels(), vec!["a"]);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;
pub mod recorder;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
pub use recorder::*;
