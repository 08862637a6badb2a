//! Discord IPC client over any async byte stream.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Framed;
use tracing::{debug, info};

use cadpresence_common::{IpcError, StatusPayload};

use crate::channel::PresenceChannel;
use crate::codec::{Frame, IpcCodec, Opcode};
use crate::protocol::{
    commands, events, Activity, CloseReason, Command, Handshake, Response, SetActivityArgs,
    RPC_VERSION,
};

/// A connection to the Discord client. Generic over the transport so tests
/// can drive it with an in-memory duplex stream.
pub struct DiscordIpcClient<S> {
    framed: Framed<S, IpcCodec>,
    io_timeout: Duration,
    pid: u32,
}

impl<S> DiscordIpcClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, io_timeout: Duration) -> Self {
        Self {
            framed: Framed::new(stream, IpcCodec),
            io_timeout,
            pid: std::process::id(),
        }
    }

    /// Perform the version handshake and wait for `READY`.
    pub async fn handshake(&mut self, client_id: &str) -> Result<(), IpcError> {
        let hello = serde_json::to_value(Handshake {
            v: RPC_VERSION,
            client_id,
        })?;
        self.send(Frame::new(Opcode::Handshake, hello)).await?;

        let response = self.recv_response(None, "handshake").await?;
        if response.is_error() {
            return Err(IpcError::HandshakeRejected(response.error().to_string()));
        }
        if response.evt.as_deref() != Some(events::READY) {
            return Err(IpcError::Protocol(format!(
                "expected READY, got {:?}",
                response.evt
            )));
        }

        info!(client_id, "Discord IPC handshake complete");
        Ok(())
    }

    /// Send `SET_ACTIVITY`; `None` clears the presence.
    pub async fn set_activity(&mut self, activity: Option<Activity>) -> Result<(), IpcError> {
        let nonce = uuid::Uuid::new_v4().to_string();
        let command = Command {
            cmd: commands::SET_ACTIVITY,
            args: SetActivityArgs {
                pid: self.pid,
                activity,
            },
            nonce: nonce.clone(),
        };
        self.send(Frame::new(Opcode::Frame, serde_json::to_value(command)?))
            .await?;

        let response = self.recv_response(Some(&nonce), "set_activity").await?;
        if response.is_error() {
            return Err(response.error());
        }
        Ok(())
    }

    /// Send a close frame and shut the stream down.
    pub async fn shutdown(&mut self) -> Result<(), IpcError> {
        self.send(Frame::new(Opcode::Close, serde_json::json!({})))
            .await?;
        tokio::time::timeout(self.io_timeout, self.framed.get_mut().shutdown())
            .await
            .map_err(|_| IpcError::Timeout("shutdown"))??;
        debug!("Discord IPC connection closed");
        Ok(())
    }

    async fn send(&mut self, frame: Frame) -> Result<(), IpcError> {
        tokio::time::timeout(self.io_timeout, self.framed.send(frame))
            .await
            .map_err(|_| IpcError::Timeout("send"))?
    }

    async fn recv_frame(&mut self) -> Result<Frame, IpcError> {
        match self.framed.next().await {
            None => Err(IpcError::Closed),
            Some(frame) => frame,
        }
    }

    /// Read frames until one answers `nonce` (or, with no nonce, until the
    /// first data frame), all within one I/O timeout. Pings are answered,
    /// unrelated dispatches skipped.
    async fn recv_response(
        &mut self,
        nonce: Option<&str>,
        stage: &'static str,
    ) -> Result<Response, IpcError> {
        let deadline = self.io_timeout;
        tokio::time::timeout(deadline, self.read_response(nonce))
            .await
            .map_err(|_| IpcError::Timeout(stage))?
    }

    async fn read_response(&mut self, nonce: Option<&str>) -> Result<Response, IpcError> {
        loop {
            let frame = self.recv_frame().await?;
            match frame.opcode {
                Opcode::Frame => {
                    let response: Response = serde_json::from_value(frame.payload)?;
                    match nonce {
                        Some(expected) if response.nonce.as_deref() != Some(expected) => {
                            debug!(evt = ?response.evt, "skipping unrelated IPC frame");
                        }
                        _ => return Ok(response),
                    }
                }
                Opcode::Ping => {
                    self.send(Frame::new(Opcode::Pong, frame.payload)).await?;
                }
                Opcode::Pong => {}
                Opcode::Close => {
                    let reason: CloseReason =
                        serde_json::from_value(frame.payload).unwrap_or_default();
                    return Err(if nonce.is_none() {
                        IpcError::HandshakeRejected(format!(
                            "{} ({})",
                            reason.message, reason.code
                        ))
                    } else {
                        IpcError::Closed
                    });
                }
                Opcode::Handshake => {
                    return Err(IpcError::Protocol(
                        "unexpected handshake frame from server".into(),
                    ));
                }
            }
        }
    }
}

#[async_trait]
impl<S> PresenceChannel for DiscordIpcClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn update(&mut self, payload: &StatusPayload) -> Result<(), IpcError> {
        self.set_activity(Some(Activity::from(payload))).await
    }

    async fn clear(&mut self) -> Result<(), IpcError> {
        self.set_activity(None).await
    }

    async fn close(&mut self) -> Result<(), IpcError> {
        self.shutdown().await
    }
}
