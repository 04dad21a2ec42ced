//! Post-merge configuration validation.
//!
//! Checks that deserialized [`Config`](crate::Config) values are within
//! accepted ranges and that the declared events do not conflict.

use std::collections::{HashMap, HashSet};

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, EventSection};

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_events(config)?;
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    one_of("logging.level", &logging.level, &[
        "trace", "debug", "info", "warn", "error",
    ])?;
    one_of("logging.format", &logging.format, &[
        "pretty", "compact", "json", "full",
    ])?;
    one_of("logging.target", &logging.target, &["stdout", "stderr", "file"])?;
    one_of("logging.rotation", &logging.rotation, &[
        "minutely", "hourly", "daily", "never",
    ])?;

    if logging.target == "file" && logging.directory.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::ValidationError {
            field: "logging.directory".to_owned(),
            message: "a directory is required when logging.target is 'file'".to_owned(),
        });
    }

    if logging.file_prefix.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.file_prefix".to_owned(),
            message: "file_prefix must not be empty".to_owned(),
        });
    }

    Ok(())
}

fn validate_events(config: &Config) -> ConfigResult<()> {
    let mut seen: HashMap<&str, &EventSection> = HashMap::new();

    for (index, event) in config.events.iter().enumerate() {
        let field = format!("events[{index}]");

        if event.name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("{field}.name"),
                message: "event name must not be empty".to_owned(),
            });
        }

        if let Some(channels) = &event.channels {
            validate_channels(&format!("{field}.channels"), channels)?;
        }

        let first = *seen.entry(event.name.as_str()).or_insert(event);
        if !std::ptr::eq(first, event) && !(first.shared || event.shared) {
            return Err(ConfigError::ValidationError {
                field: format!("{field}.name"),
                message: format!(
                    "event '{}' is declared more than once; mark it shared to allow this",
                    event.name
                ),
            });
        }
    }

    Ok(())
}

fn validate_channels(field: &str, channels: &[String]) -> ConfigResult<()> {
    if channels.is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message: "channels must list at least one channel".to_owned(),
        });
    }

    let mut unique = HashSet::with_capacity(channels.len());
    for channel in channels {
        if channel.is_empty() || !unique.insert(channel.as_str()) {
            return Err(ConfigError::ValidationError {
                field: field.to_owned(),
                message: format!("channel names must be non-empty and unique (got '{channel}')"),
            });
        }
    }

    Ok(())
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> ConfigResult<()> {
    if allowed.contains(&value) {
        return Ok(());
    }

    Err(ConfigError::ValidationError {
        field: field.to_owned(),
        message: format!(
            "unsupported value '{value}'; expected one of: {}",
            allowed.join(", ")
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> EventSection {
        EventSection {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");
    }

    #[test]
    fn test_file_target_needs_directory() {
        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.directory");

        config.logging.directory = Some("/tmp/herald".to_owned());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_duplicate_events() {
        let mut config = Config::default();
        config.events = vec![event("a"), event("a")];
        assert_eq!(field_of(validate(&config)), "events[1].name");

        config.events[1].shared = true;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_event_channels() {
        let mut config = Config::default();
        let mut section = event("a");
        section.channels = Some(vec!["x".to_owned(), "x".to_owned()]);
        config.events = vec![section];
        assert_eq!(field_of(validate(&config)), "events[0].channels");

        config.events[0].channels = Some(Vec::new());
        assert_eq!(field_of(validate(&config)), "events[0].channels");
    }

    #[test]
    fn test_empty_event_name() {
        let mut config = Config::default();
        config.events = vec![event("")];
        assert_eq!(field_of(validate(&config)), "events[0].name");
    }
}
