//! In-memory host and presence service used by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use cadpresence_common::{HostError, IpcError, StatusPayload};
use cadpresence_ipc::{PresenceChannel, PresenceConnector};

use crate::host::{
    CommandHandler, Host, HostEvent, NotificationHandler, NotificationKind, SubscriptionId,
};

#[derive(Default)]
pub struct FakeHost {
    document: Mutex<Option<String>>,
    handlers: Mutex<HashMap<SubscriptionId, (NotificationKind, NotificationHandler)>>,
    commands: Mutex<HashMap<String, CommandHandler>>,
    messages: Mutex<Vec<String>>,
    next_id: AtomicU64,
    /// When set, `register_command` fails like a host without the command definition.
    pub reject_commands: AtomicBool,
    pub reject_subscriptions: AtomicBool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_document(&self, name: Option<&str>) {
        *self.document.lock().unwrap() = name.map(str::to_string);
    }

    /// Fire a notification to every matching handler, like the host would.
    pub fn emit(&self, event: HostEvent) {
        let handlers: Vec<NotificationHandler> = self
            .handlers
            .lock()
            .unwrap()
            .values()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(event.clone());
        }
    }

    /// Switch documents and notify, as the host does on tab change.
    pub fn activate(&self, name: &str) {
        self.set_document(Some(name));
        self.emit(HostEvent::DocumentActivated {
            document: Some(name.to_string()),
        });
    }

    /// Run a registered command. Returns false if it is not registered.
    pub fn click(&self, command_id: &str) -> bool {
        let handler = self.commands.lock().unwrap().get(command_id).cloned();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    pub fn has_command(&self, command_id: &str) -> bool {
        self.commands.lock().unwrap().contains_key(command_id)
    }

    pub fn subscription_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn messages_starting_with(&self, prefix: &str) -> usize {
        self.messages()
            .iter()
            .filter(|m| m.starts_with(prefix))
            .count()
    }
}

impl Host for FakeHost {
    fn active_document_name(&self) -> Option<String> {
        self.document.lock().unwrap().clone()
    }

    fn subscribe(
        &self,
        kind: NotificationKind,
        handler: NotificationHandler,
    ) -> Result<SubscriptionId, HostError> {
        if self.reject_subscriptions.load(Ordering::SeqCst) {
            return Err(HostError::Subscription("event unavailable".into()));
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().unwrap().insert(id, (kind, handler));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), HostError> {
        self.handlers
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| HostError::Subscription(format!("unknown subscription {}", id.0)))
    }

    fn show_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn register_command(
        &self,
        command_id: &str,
        handler: CommandHandler,
    ) -> Result<(), HostError> {
        if self.reject_commands.load(Ordering::SeqCst) {
            return Err(HostError::CommandNotFound(command_id.to_string()));
        }
        self.commands
            .lock()
            .unwrap()
            .insert(command_id.to_string(), handler);
        Ok(())
    }

    fn remove_command(&self, command_id: &str) -> Result<(), HostError> {
        self.commands
            .lock()
            .unwrap()
            .remove(command_id)
            .map(|_| ())
            .ok_or_else(|| HostError::CommandNotFound(command_id.to_string()))
    }
}

/// What the fake presence service saw.
#[derive(Default)]
pub struct ServiceLog {
    pub connects: AtomicUsize,
    pub update_attempts: AtomicUsize,
    pub clears: AtomicUsize,
    pub closes: AtomicUsize,
    pub sent: Mutex<Vec<StatusPayload>>,
    pub fail_connect: AtomicBool,
    /// Number of upcoming updates that fail.
    pub failing_updates: AtomicUsize,
    pub fail_teardown: AtomicBool,
    /// How long `connect` takes, on the tokio clock.
    pub connect_delay: Mutex<Duration>,
    /// How long each `update` takes, on the tokio clock.
    pub update_delay: Mutex<Duration>,
}

impl ServiceLog {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn attempts(&self) -> usize {
        self.update_attempts.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<StatusPayload> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next_updates(&self, n: usize) {
        self.failing_updates.store(n, Ordering::SeqCst);
    }

    pub fn slow_connect(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = delay;
    }

    pub fn slow_updates(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = delay;
    }
}

#[derive(Default, Clone)]
pub struct FakeConnector {
    pub log: Arc<ServiceLog>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceConnector for FakeConnector {
    async fn connect(&self, client_id: &str) -> Result<Box<dyn PresenceChannel>, IpcError> {
        assert!(!client_id.is_empty());
        let delay = *self.log.connect_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.log.fail_connect.load(Ordering::SeqCst) {
            return Err(IpcError::SocketNotFound);
        }
        self.log.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeChannel {
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeChannel {
    log: Arc<ServiceLog>,
}

#[async_trait]
impl PresenceChannel for FakeChannel {
    async fn update(&mut self, payload: &StatusPayload) -> Result<(), IpcError> {
        self.log.update_attempts.fetch_add(1, Ordering::SeqCst);
        let delay = *self.log.update_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failing = self.log.failing_updates.load(Ordering::SeqCst);
        if failing > 0 {
            self.log.failing_updates.store(failing - 1, Ordering::SeqCst);
            return Err(IpcError::Closed);
        }
        self.log.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), IpcError> {
        self.log.clears.fetch_add(1, Ordering::SeqCst);
        if self.log.fail_teardown.load(Ordering::SeqCst) {
            return Err(IpcError::Closed);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), IpcError> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        if self.log.fail_teardown.load(Ordering::SeqCst) {
            return Err(IpcError::Timeout("shutdown"));
        }
        Ok(())
    }
}

/// Let spawned tasks run without advancing the (paused) clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
