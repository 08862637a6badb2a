//! The status record pushed to the presence service on every update.

use serde::{Deserialize, Serialize};

/// One rich-presence update.
///
/// Built fresh for every send and dropped afterwards; two payloads with the
/// same fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// First line, e.g. `Editing: Bracket.f3d`.
    pub details: String,
    /// Second line, e.g. `In Fusion 360`.
    pub state: String,
    /// Unix seconds shown as "elapsed" by the client.
    pub start_timestamp: i64,
    /// Art asset key uploaded to the application.
    pub large_image: String,
    /// Hover text for the large image.
    pub large_text: String,
}

/// Current wall-clock time in Unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
