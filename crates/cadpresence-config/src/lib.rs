//! cadpresence configuration.
//!
//! TOML-based configuration with built-in defaults. Every section has
//! defaults, so a partial file (or no file at all) works.
//!
//! ```rust,no_run
//! use cadpresence_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("refreshing every {}s", config.discord.refresh_interval_secs);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    DiscordConfig, LogLevel, LoggingConfig, PresenceConfig, ShutdownConfig, StatusConfig,
    DEFAULT_CLIENT_ID, DEFAULT_REFRESH_INTERVAL_SECS,
};

use cadpresence_common::ConfigError;
use std::path::Path;

/// Load config from `path` if given, otherwise from the platform default
/// location, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<PresenceConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}
