//! The presence updater.
//!
//! Owns the single connection to the presence service and the background
//! tasks that keep it fresh. `{idle} → start() → {running} → stop() or the
//! host's closing notification → {idle}`.
//!
//! Every failure is caught at the boundary of the operation it happens in
//! and shown to the user; nothing propagates into the host. Teardown
//! failures are only logged.

mod tasks;


use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use cadpresence_common::{unix_now, IpcError, PresenceError, StatusPayload};
use cadpresence_ipc::{PresenceChannel, PresenceConnector};

use crate::host::{Host, HostEvent, NotificationHandler, NotificationKind, SubscriptionId};
use crate::settings::UpdaterSettings;
use crate::status::build_status;

pub const MSG_ALREADY_RUNNING: &str = "Discord Presence is already running.";
pub const MSG_STARTED: &str = "Discord Rich Presence started successfully.";
pub const MSG_START_FAILED: &str = "Failed to start Discord Presence";
pub const MSG_REFRESH_FAILED: &str = "Error updating Discord presence";
pub const MSG_DOCUMENT_FAILED: &str = "Error updating Discord presence after document switch";

/// Handles owned by a running updater.
#[derive(Default)]
struct Tasks {
    refresh: Option<JoinHandle<()>>,
    dispatch: Option<JoinHandle<()>>,
    subscriptions: Vec<SubscriptionId>,
    /// Bumped on every stop; a `start` that began under an older value
    /// must not launch.
    generation: u64,
}

pub(crate) struct Inner {
    host: Arc<dyn Host>,
    connector: Arc<dyn PresenceConnector>,
    settings: UpdaterSettings,
    connection: tokio::sync::Mutex<Option<Box<dyn PresenceChannel>>>,
    /// `true` whenever no refresh task should be running.
    stop: watch::Sender<bool>,
    tasks: Mutex<Tasks>,
}

/// Keeps the presence service in sync with the host's active document.
///
/// Cheap to clone; clones share the same connection and tasks.
#[derive(Clone)]
pub struct PresenceUpdater {
    inner: Arc<Inner>,
}

impl PresenceUpdater {
    pub fn new(
        host: Arc<dyn Host>,
        connector: Arc<dyn PresenceConnector>,
        settings: UpdaterSettings,
    ) -> Self {
        let (stop, _) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                host,
                connector,
                settings,
                connection: tokio::sync::Mutex::new(None),
                stop,
                tasks: Mutex::new(Tasks::default()),
            }),
        }
    }

    /// Current status for the host's active document.
    pub fn build_status(&self) -> StatusPayload {
        self.inner.build_status()
    }

    /// Whether a connection is currently held.
    pub async fn is_running(&self) -> bool {
        self.inner.connection.lock().await.is_some()
    }

    /// Whether the stop signal is set.
    pub fn is_stopped(&self) -> bool {
        *self.inner.stop.borrow()
    }

    /// Connect, push the first status, subscribe to host notifications and
    /// launch the refresh task. Reports "already running" if a connection
    /// is already held.
    ///
    /// A `stop` that arrives while connecting wins: the new connection is
    /// closed again and nothing is launched.
    pub async fn start(&self) {
        let generation = self.inner.lock_tasks().generation;
        let mut connection = self.inner.connection.lock().await;
        if connection.is_some() {
            info!("start requested while already running");
            self.inner.host.show_message(MSG_ALREADY_RUNNING);
            return;
        }

        match self.try_start(generation).await {
            Ok(Some(channel)) => {
                *connection = Some(channel);
                info!(
                    interval_secs = self.inner.settings.refresh_interval.as_secs(),
                    "presence started"
                );
                self.inner.host.show_message(MSG_STARTED);
            }
            Ok(None) => info!("stop requested while starting, connection discarded"),
            Err(e) => {
                error!(error = %e, "failed to start presence");
                self.inner
                    .host
                    .show_message(&format!("{MSG_START_FAILED}:\n{e}"));
            }
        }
    }

    /// Connect, send the initial status and launch the background tasks.
    /// Runs with the connection lock held. `Ok(None)` when the stop
    /// generation moved on while connecting.
    async fn try_start(
        &self,
        generation: u64,
    ) -> Result<Option<Box<dyn PresenceChannel>>, PresenceError> {
        let mut channel = self
            .inner
            .connector
            .connect(&self.inner.settings.client_id)
            .await?;

        let payload = self.build_status();
        if let Err(e) = channel.update(&payload).await {
            if let Err(close_err) = channel.close().await {
                debug!(error = %close_err, "close after failed initial update");
            }
            return Err(e.into());
        }
        debug!(details = %payload.details, "initial presence sent");

        match self.launch(generation) {
            Ok(true) => Ok(Some(channel)),
            Ok(false) => {
                discard(channel).await;
                Ok(None)
            }
            Err(e) => {
                self.inner.detach_handlers();
                discard(channel).await;
                Err(e)
            }
        }
    }

    /// Subscribe to host notifications and spawn the background tasks.
    /// Returns `Ok(false)` without touching anything if a stop was signalled
    /// since `generation` was read.
    fn launch(&self, generation: u64) -> Result<bool, PresenceError> {
        let mut running = self.inner.lock_tasks();
        if running.generation != generation {
            return Ok(false);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        for kind in [
            NotificationKind::DocumentActivated,
            NotificationKind::ApplicationClosing,
        ] {
            let tx = event_tx.clone();
            let handler: NotificationHandler = Arc::new(move |event: HostEvent| {
                // The receiver is gone once the updater stopped.
                let _ = tx.send(event);
            });
            let id = self.inner.host.subscribe(kind, handler)?;
            running.subscriptions.push(id);
        }

        self.inner.stop.send_replace(false);
        let first_tick = tokio::time::Instant::now() + self.inner.settings.refresh_interval;
        // A dispatcher left over from a closing notification has already
        // seen the stop signal.
        running.refresh = Some(tokio::spawn(tasks::refresh_loop(
            Arc::clone(&self.inner),
            self.inner.stop.subscribe(),
            first_tick,
        )));
        running.dispatch = Some(tokio::spawn(tasks::dispatch_loop(
            Arc::clone(&self.inner),
            event_rx,
            self.inner.stop.subscribe(),
        )));
        Ok(true)
    }

    /// Push the current status immediately. Does nothing when idle.
    pub async fn on_document_changed(&self, document: Option<&str>) {
        debug!(document = ?document, "document activated");
        self.inner.on_document_changed().await;
    }

    /// Set the stop signal and tear the connection down, ignoring errors.
    pub async fn on_application_closing(&self) {
        self.inner.on_application_closing().await;
    }

    /// Stop the refresh task (waiting at most the stop timeout), close the
    /// connection and detach all host handlers. Safe to call when idle.
    pub async fn stop(&self) {
        self.inner.signal_stop();
        self.inner.join_refresh().await;

        if self.inner.teardown().await {
            info!("presence stopped");
        }
        self.inner.detach_handlers();

        let dispatch = self.inner.lock_tasks().dispatch.take();
        if let Some(handle) = dispatch {
            let timeout = self.inner.settings.stop_timeout;
            if tokio::time::timeout(timeout, handle).await.is_err() {
                warn!("notification dispatcher did not exit in time, detaching it");
            }
        }
    }
}

impl Inner {
    fn build_status(&self) -> StatusPayload {
        build_status(self.host.as_ref(), &self.settings.status, unix_now())
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set the stop signal and invalidate any `start` still connecting.
    fn signal_stop(&self) {
        let mut tasks = self.lock_tasks();
        tasks.generation = tasks.generation.wrapping_add(1);
        self.stop.send_replace(true);
    }

    /// Send the current status. `Ok(false)` when there is no connection.
    async fn push_status(&self) -> Result<bool, IpcError> {
        let mut connection = self.connection.lock().await;
        let Some(channel) = connection.as_mut() else {
            return Ok(false);
        };
        let payload = self.build_status();
        channel.update(&payload).await?;
        debug!(details = %payload.details, "presence updated");
        Ok(true)
    }

    async fn on_document_changed(&self) {
        match self.push_status().await {
            Ok(true) => {}
            Ok(false) => debug!("document change ignored, presence not running"),
            Err(e) => {
                warn!(error = %e, "presence update after document switch failed");
                self.host
                    .show_message(&format!("{MSG_DOCUMENT_FAILED}:\n{e}"));
            }
        }
    }

    async fn on_application_closing(&self) {
        info!("host closing, tearing down presence");
        self.signal_stop();
        self.teardown().await;
        self.detach_handlers();
        self.join_refresh().await;
    }

    /// Wait at most the stop timeout for the refresh task to observe the
    /// stop signal. A task that overruns is detached.
    async fn join_refresh(&self) {
        let Some(handle) = self.lock_tasks().refresh.take() else {
            return;
        };
        let timeout = self.settings.stop_timeout;
        if tokio::time::timeout(timeout, handle).await.is_err() {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "refresh task did not exit in time, detaching it"
            );
        }
    }

    /// Clear and close the connection if one is held. Errors are swallowed.
    /// Returns whether a connection was torn down.
    async fn teardown(&self) -> bool {
        let channel = self.connection.lock().await.take();
        let Some(channel) = channel else {
            return false;
        };
        discard(channel).await;
        true
    }

    fn detach_handlers(&self) {
        let subscriptions = std::mem::take(&mut self.lock_tasks().subscriptions);
        for id in subscriptions {
            if let Err(e) = self.host.unsubscribe(id) {
                debug!(subscription = id.0, error = %e, "failed to detach host handler");
            }
        }
    }
}

/// Clear and close a channel, logging failures at debug only.
async fn discard(mut channel: Box<dyn PresenceChannel>) {
    if let Err(e) = channel.clear().await {
        debug!(error = %e, "clearing presence during teardown failed");
    }
    if let Err(e) = channel.close().await {
        debug!(error = %e, "closing presence connection failed");
    }
}
