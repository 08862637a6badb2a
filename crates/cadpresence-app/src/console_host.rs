//! A stand-in CAD host driven from the terminal.
//!
//! Keeps the active document, the registered commands and the notification
//! handlers the add-in attached, and fires notifications when the user
//! types host commands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use cadpresence_common::HostError;
use cadpresence_core::{
    CommandHandler, Host, HostEvent, NotificationHandler, NotificationKind, SubscriptionId,
};

#[derive(Default)]
struct HostState {
    document: Option<String>,
    handlers: HashMap<SubscriptionId, (NotificationKind, NotificationHandler)>,
    commands: HashMap<String, CommandHandler>,
}

#[derive(Default)]
pub struct ConsoleHost {
    state: Mutex<HostState>,
    next_id: AtomicU64,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `name` the active document and announce the switch.
    pub fn open_document(&self, name: &str) {
        self.state().document = Some(name.to_string());
        self.emit(HostEvent::DocumentActivated {
            document: Some(name.to_string()),
        });
    }

    /// Close the active document and announce that nothing is active.
    pub fn close_document(&self) {
        self.state().document = None;
        self.emit(HostEvent::DocumentActivated { document: None });
    }

    /// Run the handler registered for `command_id`.
    pub fn activate_command(&self, command_id: &str) -> Result<(), HostError> {
        let handler = self.state().commands.get(command_id).cloned();
        let handler = handler.ok_or_else(|| HostError::CommandNotFound(command_id.to_string()))?;
        handler();
        Ok(())
    }

    /// Deliver `event` to every handler subscribed to its kind. Handlers are
    /// called without holding the state lock so they may call back in.
    pub fn emit(&self, event: HostEvent) {
        let handlers: Vec<NotificationHandler> = self
            .state()
            .handlers
            .values()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        debug!(event = ?event, handlers = handlers.len(), "emitting host notification");
        for handler in handlers {
            handler(event.clone());
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.state().handlers.len()
    }
}

impl Host for ConsoleHost {
    fn active_document_name(&self) -> Option<String> {
        self.state().document.clone()
    }

    fn subscribe(
        &self,
        kind: NotificationKind,
        handler: NotificationHandler,
    ) -> Result<SubscriptionId, HostError> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.state().handlers.insert(id, (kind, handler));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), HostError> {
        match self.state().handlers.remove(&id) {
            Some(_) => Ok(()),
            None => Err(HostError::Subscription(format!(
                "unknown subscription {}",
                id.0
            ))),
        }
    }

    fn show_message(&self, message: &str) {
        println!("[cadpresence] {message}");
    }

    fn register_command(
        &self,
        command_id: &str,
        handler: CommandHandler,
    ) -> Result<(), HostError> {
        self.state()
            .commands
            .insert(command_id.to_string(), handler);
        Ok(())
    }

    fn remove_command(&self, command_id: &str) -> Result<(), HostError> {
        match self.state().commands.remove(command_id) {
            Some(_) => Ok(()),
            None => Err(HostError::CommandNotFound(command_id.to_string())),
        }
    }
}
