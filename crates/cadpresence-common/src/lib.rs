pub mod errors;
pub mod status;

pub use errors::{ConfigError, HostError, IpcError, PresenceError};
pub use status::{unix_now, StatusPayload};
