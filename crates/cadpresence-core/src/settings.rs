use std::time::Duration;

use cadpresence_config::{PresenceConfig, StatusConfig};

/// Runtime settings for the updater, resolved from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterSettings {
    pub client_id: String,
    pub refresh_interval: Duration,
    pub stop_timeout: Duration,
    pub status: StatusConfig,
}

impl From<&PresenceConfig> for UpdaterSettings {
    fn from(config: &PresenceConfig) -> Self {
        Self {
            client_id: config.discord.client_id.clone(),
            // A zero period would make the interval panic.
            refresh_interval: Duration::from_secs(u64::from(
                config.discord.refresh_interval_secs.max(1),
            )),
            stop_timeout: Duration::from_millis(u64::from(config.shutdown.stop_timeout_ms)),
            status: config.status.clone(),
        }
    }
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self::from(&PresenceConfig::default())
    }
}
