//! Configuration types.
//!
//! These types have no dependency on the emitter crate; conversion into
//! event definitions happens in `herald_events::config_bridge`. Every section
//! implements [`Default`], so a bare `[section]` header yields a working
//! configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Emitter behaviour.
    pub emitter: EmitterSection,
    /// Logging level, format and output.
    pub logging: LoggingSection,
    /// Events registered when an emitter is built from this config.
    pub events: Vec<EventSection>,
}

/// `[emitter]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitterSection {
    /// Validate event definitions on registration.
    pub validate: bool,
}

impl Default for EmitterSection {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoggingSection {
    /// Global level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Output target: `"stdout"`, `"stderr"` or `"file"`.
    pub target: String,
    /// Log directory, required when `target = "file"`.
    pub directory: Option<String>,
    /// File name prefix for file output.
    pub file_prefix: String,
    /// File rotation: `"minutely"`, `"hourly"`, `"daily"` or `"never"`.
    pub rotation: String,
    /// Per-target directives (e.g. `["herald_events=trace"]`).
    pub directives: Vec<String>,
    /// Include timestamps.
    pub timestamps: bool,
    /// Use ANSI colors.
    pub ansi: bool,
    /// Include source file and line.
    pub file_info: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            target: "stderr".to_owned(),
            directory: None,
            file_prefix: "herald".to_owned(),
            rotation: "daily".to_owned(),
            directives: Vec::new(),
            timestamps: true,
            ansi: true,
            file_info: false,
        }
    }
}

/// One `[[events]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventSection {
    /// Event name.
    pub name: String,
    /// Allowed channels; absent means unrestricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,
    /// Deliver a deep copy of the data to each listener.
    #[serde(default)]
    pub clone: bool,
    /// Deliver array data as separate arguments.
    #[serde(default)]
    pub spread: bool,
    /// Append the update's tag map as the last argument.
    #[serde(default)]
    pub tags: bool,
    /// Allow the same name to be registered again.
    #[serde(default)]
    pub shared: bool,
}
