//! Background tasks of a running updater.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use super::{Inner, MSG_REFRESH_FAILED};
use crate::host::HostEvent;

/// Re-send the status every refresh interval until the stop signal is set.
///
/// The first refresh fires at `first_tick`; `start` has already sent the
/// initial status. A stop wakes the loop immediately, but an update that is
/// already in flight is allowed to finish.
pub(super) async fn refresh_loop(
    inner: Arc<Inner>,
    mut stop_rx: watch::Receiver<bool>,
    first_tick: Instant,
) {
    let period = inner.settings.refresh_interval;
    let mut ticker = tokio::time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow_and_update() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        if *stop_rx.borrow() {
            break;
        }

        match inner.push_status().await {
            Ok(true) => trace!("scheduled presence refresh sent"),
            Ok(false) => {
                debug!("connection gone, refresh loop exiting");
                break;
            }
            Err(e) => {
                warn!(error = %e, "scheduled presence refresh failed");
                inner
                    .host
                    .show_message(&format!("{MSG_REFRESH_FAILED}:\n{e}"));
            }
        }
    }

    debug!("refresh loop exited");
}

/// Deliver host notifications to the updater in arrival order.
pub(super) async fn dispatch_loop(
    inner: Arc<Inner>,
    mut events: mpsc::UnboundedReceiver<HostEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(HostEvent::DocumentActivated { document }) => {
                    debug!(document = ?document, "document activated");
                    inner.on_document_changed().await;
                }
                Some(HostEvent::ApplicationClosing) => {
                    inner.on_application_closing().await;
                }
                None => break,
            },
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow_and_update() {
                    break;
                }
            }
        }
    }

    debug!("notification dispatcher exited");
}
