//! Presence service IPC.
//!
//! `PresenceConnector` / `PresenceChannel` are the seams the updater talks
//! to. `DiscordConnector` implements them against the local Discord client:
//! a Unix socket (or Windows named pipe) carrying length-prefixed JSON frames.

pub mod channel;
pub mod client;
pub mod codec;
pub mod protocol;
pub mod transport;

pub use channel::{PresenceChannel, PresenceConnector};
pub use client::DiscordIpcClient;
pub use codec::{Frame, IpcCodec, Opcode};
pub use protocol::Activity;
pub use transport::{candidate_paths, connect_socket, DiscordConnector};
