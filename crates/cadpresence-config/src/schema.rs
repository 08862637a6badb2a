//! Configuration schema.
//!
//! Every section carries `#[serde(default)]`, so a file only needs the keys
//! it wants to override.

use serde::{Deserialize, Serialize};

/// Application id registered in the Discord developer portal.
pub const DEFAULT_CLIENT_ID: &str = "YOUR_DISCORD_CLIENT_ID";
/// Seconds between automatic presence refreshes.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u32 = 15;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub discord: DiscordConfig,
    pub status: StatusConfig,
    pub shutdown: ShutdownConfig,
    pub logging: LoggingConfig,
}

/// Connection to the presence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub client_id: String,
    /// Valid range: 1-3600.
    pub refresh_interval_secs: u32,
    /// Per-operation IPC timeout (valid range: 100-60000).
    pub io_timeout_ms: u32,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            io_timeout_ms: 5000,
        }
    }
}

/// Labels used to build the status payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub details_prefix: String,
    /// Shown in place of a document name when nothing is open.
    pub fallback_document: String,
    pub state: String,
    pub large_image: String,
    pub large_text: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            details_prefix: "Editing: ".to_string(),
            fallback_document: "No Document".to_string(),
            state: "In Fusion 360".to_string(),
            large_image: "fusion_logo".to_string(),
            large_text: "Autodesk Fusion 360".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long `stop` waits for the refresh task (valid range: 0-60000).
    pub stop_timeout_ms: u32,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            stop_timeout_ms: 2000,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_constants() {
        let config = PresenceConfig::default();
        assert_eq!(config.discord.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.discord.refresh_interval_secs, 15);
        assert_eq!(config.status.details_prefix, "Editing: ");
        assert_eq!(config.status.fallback_document, "No Document");
        assert_eq!(config.shutdown.stop_timeout_ms, 2000);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config: PresenceConfig = toml::from_str("").unwrap();
        assert_eq!(config, PresenceConfig::default());
    }

    #[test]
    fn log_level_parses_lowercase() {
        let config: PresenceConfig = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.level.as_str(), "debug");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let result = toml::from_str::<PresenceConfig>("[logging]\nlevel = \"loud\"");
        assert!(result.is_err());
    }
}
