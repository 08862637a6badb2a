//! Discord rich presence for a CAD host.
//!
//! [`PresenceUpdater`] keeps the presence in sync with the host's active
//! document; [`PresenceAddIn`] wires it into the host's command and
//! notification machinery.

pub mod addin;
pub mod host;
pub mod settings;
pub mod status;
pub mod updater;

#[cfg(test)]
pub(crate) mod test_support;

pub use addin::{PresenceAddIn, START_COMMAND_ID};
pub use host::{
    CommandHandler, Host, HostEvent, NotificationHandler, NotificationKind, SubscriptionId,
};
pub use settings::UpdaterSettings;
pub use status::build_status;
pub use updater::PresenceUpdater;
