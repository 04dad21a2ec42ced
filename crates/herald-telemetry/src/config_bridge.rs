//! Bridge from `herald_config` logging settings to [`LogConfig`].

use std::path::PathBuf;

use herald_config::{Config, LoggingSection};

use crate::logging::{FileRotation, LogConfig, LogFormat, LogTarget};

impl From<&LoggingSection> for LogConfig {
    /// Values are expected to have passed `herald_config` validation;
    /// anything unrecognized falls back to the default.
    fn from(section: &LoggingSection) -> Self {
        let format = match section.format.as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            "full" => LogFormat::Full,
            _ => LogFormat::Compact,
        };

        let rotation = match section.rotation.as_str() {
            "minutely" => FileRotation::Minutely,
            "hourly" => FileRotation::Hourly,
            "never" => FileRotation::Never,
            _ => FileRotation::Daily,
        };

        let mut config = Self {
            level: section.level.clone(),
            format,
            target: LogTarget::Stderr,
            file_prefix: section.file_prefix.clone(),
            rotation,
            timestamps: section.timestamps,
            ansi: section.ansi,
            file_info: section.file_info,
            directives: section.directives.clone(),
        };

        match (section.target.as_str(), &section.directory) {
            ("stdout", _) => config.target = LogTarget::Stdout,
            ("file", Some(directory)) => {
                config.target = LogTarget::File(PathBuf::from(directory));
                config.ansi = false;
            },
            _ => {},
        }

        config
    }
}

/// Convert the `[logging]` table of `cfg`.
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    LogConfig::from(&cfg.logging)
}
