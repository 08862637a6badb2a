//! Locating and opening the Discord IPC socket.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use cadpresence_common::IpcError;

use crate::channel::{PresenceChannel, PresenceConnector};
use crate::client::DiscordIpcClient;

/// Discord listens on the first free slot of `discord-ipc-0` .. `discord-ipc-9`.
pub const IPC_SLOTS: u8 = 10;

#[cfg(unix)]
pub type IpcStream = tokio::net::UnixStream;
#[cfg(windows)]
pub type IpcStream = tokio::net::windows::named_pipe::NamedPipeClient;

/// Directories searched for the socket on Unix. Sandboxed installs (Flatpak,
/// Snap) put it in a subdirectory of the runtime dir.
#[cfg(unix)]
fn socket_dirs() -> Vec<PathBuf> {
    let base = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
        .iter()
        .filter_map(|key| std::env::var_os(key))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    vec![
        base.clone(),
        base.join("app/com.discordapp.Discord"),
        base.join("app/com.discordapp.DiscordCanary"),
        base.join("snap.discord"),
    ]
}

/// Every socket path worth trying, in order: all slots of the runtime dir,
/// then all slots of each sandbox subdirectory.
#[cfg(unix)]
pub fn candidate_paths() -> Vec<PathBuf> {
    socket_dirs()
        .into_iter()
        .flat_map(|dir| (0..IPC_SLOTS).map(move |slot| dir.join(format!("discord-ipc-{slot}"))))
        .collect()
}

#[cfg(windows)]
pub fn candidate_paths() -> Vec<PathBuf> {
    (0..IPC_SLOTS)
        .map(|slot| PathBuf::from(format!(r"\\?\pipe\discord-ipc-{slot}")))
        .collect()
}

#[cfg(unix)]
async fn open(path: &std::path::Path) -> std::io::Result<IpcStream> {
    tokio::net::UnixStream::connect(path).await
}

#[cfg(windows)]
async fn open(path: &std::path::Path) -> std::io::Result<IpcStream> {
    tokio::net::windows::named_pipe::ClientOptions::new().open(path)
}

/// Open the first candidate socket that accepts a connection.
pub async fn connect_socket() -> Result<IpcStream, IpcError> {
    for path in candidate_paths() {
        match open(&path).await {
            Ok(stream) => {
                info!(path = %path.display(), "connected to Discord IPC socket");
                return Ok(stream);
            }
            Err(e) => debug!(path = %path.display(), error = %e, "IPC socket unavailable"),
        }
    }
    Err(IpcError::SocketNotFound)
}

/// Connector for the real Discord client.
#[derive(Debug, Clone)]
pub struct DiscordConnector {
    io_timeout: Duration,
}

impl DiscordConnector {
    pub fn new(io_timeout: Duration) -> Self {
        Self { io_timeout }
    }
}

#[async_trait]
impl PresenceConnector for DiscordConnector {
    async fn connect(&self, client_id: &str) -> Result<Box<dyn PresenceChannel>, IpcError> {
        let stream = tokio::time::timeout(self.io_timeout, connect_socket())
            .await
            .map_err(|_| IpcError::Timeout("connect"))??;
        let mut client = DiscordIpcClient::new(stream, self.io_timeout);
        client.handshake(client_id).await?;
        Ok(Box::new(client))
    }
}
