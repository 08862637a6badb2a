//! Seams between the updater and the presence service.

use async_trait::async_trait;
use cadpresence_common::{IpcError, StatusPayload};

/// An open, handshaken connection to the presence service.
#[async_trait]
pub trait PresenceChannel: Send {
    /// Replace the displayed presence with `payload`.
    async fn update(&mut self, payload: &StatusPayload) -> Result<(), IpcError>;

    /// Remove the displayed presence.
    async fn clear(&mut self) -> Result<(), IpcError>;

    /// Disconnect. The channel must not be used afterwards.
    async fn close(&mut self) -> Result<(), IpcError>;
}

/// Opens presence channels.
#[async_trait]
pub trait PresenceConnector: Send + Sync {
    async fn connect(&self, client_id: &str) -> Result<Box<dyn PresenceChannel>, IpcError>;
}
