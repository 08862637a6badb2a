//! Building the presence payload from host state.

use cadpresence_common::StatusPayload;
use cadpresence_config::StatusConfig;

use crate::host::Host;

/// Build the payload for the host's current document at `now` (Unix seconds).
pub fn build_status(host: &dyn Host, labels: &StatusConfig, now: i64) -> StatusPayload {
    let document = host
        .active_document_name()
        .unwrap_or_else(|| labels.fallback_document.clone());

    StatusPayload {
        details: format!("{}{}", labels.details_prefix, document),
        state: labels.state.clone(),
        start_timestamp: now,
        large_image: labels.large_image.clone(),
        large_text: labels.large_text.clone(),
    }
}
