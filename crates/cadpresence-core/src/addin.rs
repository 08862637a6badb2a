//! Add-in entry points: wire the start command into the host and tear
//! everything down when the host unloads the add-in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use cadpresence_ipc::PresenceConnector;

use crate::host::{CommandHandler, Host};
use crate::settings::UpdaterSettings;
use crate::updater::PresenceUpdater;

/// Command id declared in the add-in manifest.
pub const START_COMMAND_ID: &str = "startDiscordPresence";

pub const MSG_RUN_FAILED: &str = "Add-in start failed";
pub const MSG_STOP_FAILED: &str = "Add-in stop failed";

pub struct PresenceAddIn {
    host: Arc<dyn Host>,
    updater: PresenceUpdater,
    registered: AtomicBool,
}

impl PresenceAddIn {
    pub fn new(
        host: Arc<dyn Host>,
        connector: Arc<dyn PresenceConnector>,
        settings: UpdaterSettings,
    ) -> Self {
        let updater = PresenceUpdater::new(Arc::clone(&host), connector, settings);
        Self {
            host,
            updater,
            registered: AtomicBool::new(false),
        }
    }

    pub fn updater(&self) -> &PresenceUpdater {
        &self.updater
    }

    /// Register the start command with the host. Activating it starts the
    /// updater on the current tokio runtime. Failures are shown to the user.
    pub fn run(&self) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "add-in run outside a tokio runtime");
                self.host.show_message(&format!("{MSG_RUN_FAILED}:\n{e}"));
                return;
            }
        };

        let updater = self.updater.clone();
        let handler: CommandHandler = Arc::new(move || {
            let updater = updater.clone();
            runtime.spawn(async move { updater.start().await });
        });

        match self.host.register_command(START_COMMAND_ID, handler) {
            Ok(()) => {
                self.registered.store(true, Ordering::SeqCst);
                info!(command = START_COMMAND_ID, "start command registered");
            }
            Err(e) => {
                error!(error = %e, "failed to register start command");
                self.host.show_message(&format!("{MSG_RUN_FAILED}:\n{e}"));
            }
        }
    }

    /// Remove the start command and stop the updater.
    pub async fn stop(&self) {
        if self.registered.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.host.remove_command(START_COMMAND_ID) {
                error!(error = %e, "failed to remove start command");
                self.host.show_message(&format!("{MSG_STOP_FAILED}:\n{e}"));
            }
        }
        self.updater.stop().await;
    }
}
