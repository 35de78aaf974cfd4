//! Transport abstraction: send prompt text, get response text back.
//!
//! The only channel to the model may be a scraped, UI-driven session
//! whose completion is observable solely by watching rendered output.
//! This module hides that behind a request/response trait; the polled
//! implementation and its completion detector live in submodules.

pub mod completion;
mod polled;

pub use completion::{CompletionDetector, PollConfig, Sample};
pub use polled::{ResponseSurface, SurfaceTransport};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Message fragments that indicate the remote session was torn down.
/// Seeing one means the channel must be reinitialized, not retried.
const SESSION_LOST_MARKERS: &[&str] = &["Session closed", "Target closed", "detached Frame"];

/// A file attached to a call in upload mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Workspace-relative path, shown to the model.
    pub path: String,
    /// File contents.
    pub content: String,
}

/// Per-call options.
///
/// `attachments` switches the call into upload mode: the files and
/// workspace summary travel out of band instead of being inlined in
/// the prompt text.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Model identifier, when the channel supports selection.
    pub model: Option<String>,
    /// Generation temperature.
    pub temperature: Option<f32>,
    /// Files to attach (upload mode when non-empty).
    pub attachments: Vec<FileAttachment>,
    /// Workspace summary accompanying the attachments.
    pub workspace_summary: Option<String>,
}

impl CallOptions {
    /// Whether this call should use upload mode.
    pub fn is_upload(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// Errors surfaced by a transport.
///
/// `SessionLost` is classified separately from other channel failures
/// so callers can decide between retrying the call and reinitializing
/// the channel.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The response never stabilized within the polling budget.
    #[error("Response did not complete within {waited:?}")]
    Timeout {
        /// Total time spent polling.
        waited: Duration,
    },

    /// The remote session was torn down mid-call.
    #[error("Session lost: {message}")]
    SessionLost {
        /// Underlying channel message.
        message: String,
    },

    /// The final extraction pass produced no text.
    #[error("Could not extract response text")]
    EmptyResponse,

    /// Any other channel failure.
    #[error("Transport channel error: {message}")]
    Channel {
        /// Underlying channel message.
        message: String,
    },
}

impl TransportError {
    /// Classify a raw channel error message.
    ///
    /// Known session-teardown substrings become `SessionLost`;
    /// everything else is a generic channel error.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if SESSION_LOST_MARKERS.iter().any(|m| message.contains(m)) {
            Self::SessionLost { message }
        } else {
            Self::Channel { message }
        }
    }

    /// Whether the channel must be reinitialized before another call.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Self::SessionLost { .. })
    }
}

/// The call contract every channel implements.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send a rendered prompt and wait for the complete response text.
    async fn call(&self, prompt: &str, options: &CallOptions) -> Result<String, TransportError>;

    /// Channel name for logging.
    fn name(&self) -> &str;
}
