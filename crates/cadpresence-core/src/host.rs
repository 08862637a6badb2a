//! The CAD host as seen by the add-in.
//!
//! The host owns the documents, the notification sources and the UI. The
//! add-in only needs the handful of primitives below.

use std::sync::Arc;

use cadpresence_common::HostError;

/// Handle returned by [`Host::subscribe`], used to detach the handler again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    DocumentActivated,
    ApplicationClosing,
}

/// A notification emitted by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The user switched to another document (or closed the last one).
    DocumentActivated { document: Option<String> },
    /// The host application is shutting down.
    ApplicationClosing,
}

impl HostEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            HostEvent::DocumentActivated { .. } => NotificationKind::DocumentActivated,
            HostEvent::ApplicationClosing => NotificationKind::ApplicationClosing,
        }
    }
}

/// Called on the host's notification context. Must not block.
pub type NotificationHandler = Arc<dyn Fn(HostEvent) + Send + Sync>;

/// Called when the user activates a registered command.
pub type CommandHandler = Arc<dyn Fn() + Send + Sync>;

pub trait Host: Send + Sync {
    /// Name of the active document, if any.
    fn active_document_name(&self) -> Option<String>;

    fn subscribe(
        &self,
        kind: NotificationKind,
        handler: NotificationHandler,
    ) -> Result<SubscriptionId, HostError>;

    /// Detach a handler. The host drops its reference to the handler.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), HostError>;

    /// Show a message to the user.
    fn show_message(&self, message: &str);

    /// Wire `handler` to the user-facing command `command_id`.
    fn register_command(&self, command_id: &str, handler: CommandHandler)
        -> Result<(), HostError>;

    fn remove_command(&self, command_id: &str) -> Result<(), HostError>;
}
