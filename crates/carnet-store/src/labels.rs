//! Label synchronizer.
//!
//! Memo writes reference labels by name; a label that does not exist in
//! the backing repository would be rejected or silently dropped, so every
//! create/update that changes tags or the pinned flag runs
//! [`ensure_labels`] first. The synchronizer is idempotent: a label that
//! already exists, including one created by a racing writer, is success.

use tracing::debug;

use carnet_core::defaults::{PINNED_LABEL, PINNED_LABEL_COLOR, TAG_LABEL_COLOR};
use carnet_core::{Error, Result};
use carnet_github::GitHubClient;

/// Creation color for a label, by label class.
pub fn label_color(name: &str) -> &'static str {
    if name == PINNED_LABEL {
        PINNED_LABEL_COLOR
    } else {
        TAG_LABEL_COLOR
    }
}

/// Ensure every named label exists, creating the missing ones.
pub async fn ensure_labels(client: &GitHubClient, labels: &[String]) -> Result<()> {
    for label in labels {
        match client.get_label(label).await {
            Ok(_) => continue,
            Err(e) if e.is_not_found() => {
                debug!("Creating missing label: {}", label);
                match client.create_label(label, label_color(label)).await {
                    Ok(_) => {}
                    // A racing writer created it first; that is the outcome
                    // we wanted.
                    Err(Error::Conflict(_)) | Err(Error::Api { status: 422, .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
