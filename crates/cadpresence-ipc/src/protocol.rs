//! JSON payloads exchanged over the Discord IPC socket.

use cadpresence_common::{IpcError, StatusPayload};
use serde::{Deserialize, Serialize};

/// IPC protocol version sent in the handshake.
pub const RPC_VERSION: u32 = 1;

pub mod commands {
    pub const SET_ACTIVITY: &str = "SET_ACTIVITY";
}

pub mod events {
    pub const READY: &str = "READY";
    pub const ERROR: &str = "ERROR";
}

#[derive(Debug, Clone, Serialize)]
pub struct Handshake<'a> {
    pub v: u32,
    pub client_id: &'a str,
}

/// Activity object as Discord expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub details: String,
    pub state: String,
    pub timestamps: Timestamps,
    pub assets: Assets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub start: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    pub large_image: String,
    pub large_text: String,
}

impl From<&StatusPayload> for Activity {
    fn from(payload: &StatusPayload) -> Self {
        Self {
            details: payload.details.clone(),
            state: payload.state.clone(),
            timestamps: Timestamps {
                start: payload.start_timestamp,
            },
            assets: Assets {
                large_image: payload.large_image.clone(),
                large_text: payload.large_text.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetActivityArgs {
    pub pid: u32,
    /// `None` serializes as `null`, which clears the presence.
    pub activity: Option<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Command<A> {
    pub cmd: &'static str,
    pub args: A,
    pub nonce: String,
}

/// Any frame Discord sends back: command replies and dispatched events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub evt: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Response {
    pub fn is_error(&self) -> bool {
        self.evt.as_deref() == Some(events::ERROR)
    }

    /// Turn an `ERROR` reply into an `IpcError::Command`.
    pub fn error(&self) -> IpcError {
        let data = self.data.as_ref();
        let code = data
            .and_then(|d| d.get("code"))
            .and_then(|c| c.as_i64())
            .unwrap_or_default();
        let message = data
            .and_then(|d| d.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        IpcError::Command { code, message }
    }
}

/// Payload of a close frame sent by Discord.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloseReason {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}
