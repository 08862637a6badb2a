//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` instead of stopping at
//! the first one.

use crate::schema::PresenceConfig;
use cadpresence_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PresenceConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.discord.client_id.trim().is_empty() {
        errors.push("discord.client_id must not be empty".to_string());
    }
    validate_range(
        &mut errors,
        "discord.refresh_interval_secs",
        config.discord.refresh_interval_secs,
        1,
        3600,
    );
    validate_range(
        &mut errors,
        "discord.io_timeout_ms",
        config.discord.io_timeout_ms,
        100,
        60_000,
    );
    validate_range(
        &mut errors,
        "shutdown.stop_timeout_ms",
        config.shutdown.stop_timeout_ms,
        0,
        60_000,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
