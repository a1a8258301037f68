//! Progress reporting towards the UI.

use log::trace;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::guidance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Negotiating,
    Analyzing,
    /// Something was recognised, but not confidently enough yet.
    Focused,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub status: ProgressStatus,
    /// Guidance message key, resolved to text at the presentation boundary.
    pub message_key: &'static str,
    pub confidence_percent: u8,
    /// Attempt the update belongs to, if any.
    pub attempt: Option<u32>,
}

/// Sending half of the progress channel. A dropped receiver is not an error.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: UnboundedSender<ProgressUpdate>,
}

impl ProgressSink {
    pub fn new(tx: UnboundedSender<ProgressUpdate>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, status: ProgressStatus, confidence_percent: u8, attempt: Option<u32>) {
        let update = ProgressUpdate {
            status,
            message_key: guidance::progress_message_key(status),
            confidence_percent,
            attempt,
        };
        if self.tx.send(update).is_err() {
            trace!("Progress receiver dropped");
        }
    }

    /// Terminal failure update carrying the category's guidance key.
    pub fn emit_failure(&self, message_key: &'static str, attempt: Option<u32>) {
        let update = ProgressUpdate {
            status: ProgressStatus::Failed,
            message_key,
            confidence_percent: 0,
            attempt,
        };
        if self.tx.send(update).is_err() {
            trace!("Progress receiver dropped");
        }
    }
}
