use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("no presence socket found (is Discord running?)")]
    SocketNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ipc timed out during {0}")]
    Timeout(&'static str),

    #[error("frame of {0} bytes exceeds the ipc limit")]
    FrameTooLarge(usize),

    #[error("ipc protocol error: {0}")]
    Protocol(String),

    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),

    #[error("command failed ({code}): {message}")]
    Command { code: i64, message: String },

    #[error("ipc connection closed")]
    Closed,
}

impl From<serde_json::Error> for IpcError {
    fn from(err: serde_json::Error) -> Self {
        IpcError::Protocol(format!("invalid json: {err}"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("command definition not found: {0}")]
    CommandNotFound(String),

    #[error("subscription failed: {0}")]
    Subscription(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error(transparent)]
    Ipc(#[from] IpcError),

    #[error(transparent)]
    Host(#[from] HostError),
}
