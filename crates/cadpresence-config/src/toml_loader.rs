//! TOML config file loading.

use crate::schema::PresenceConfig;
use crate::validation;
use cadpresence_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load config from a specific TOML file path.
///
/// Missing fields take their defaults. If the parsed file fails validation,
/// a warning is logged and the default config is returned.
pub fn load_from_path(path: &Path) -> Result<PresenceConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config: PresenceConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
        warn!("falling back to default config");
        return Ok(PresenceConfig::default());
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/cadpresence/config.toml`
/// On Windows: `%APPDATA%\cadpresence\config.toml`
///
/// A missing file is not an error; the built-in defaults are used.
pub fn load_default() -> Result<PresenceConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, using defaults", path.display());
        return Ok(PresenceConfig::default());
    }

    load_from_path(&path)
}

/// Get the platform-specific default config file path.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::ParseError("could not determine config directory".into())
    })?;
    Ok(config_dir.join("cadpresence").join("config.toml"))
}
