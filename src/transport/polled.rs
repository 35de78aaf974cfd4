//! Polled transport over a rendered response surface.

use crate::transport::completion::{CompletionDetector, PollConfig, Sample};
use crate::transport::{CallOptions, Transport, TransportError};

/// The seam to the actual UI-driving code.
///
/// Implementations own the selectors, click sequences, and session
/// plumbing for a concrete web UI; this crate only needs to submit a
/// prompt, observe the rendered output, and extract the final text.
#[async_trait::async_trait]
pub trait ResponseSurface: Send + Sync {
    /// Submit a prompt (typing, uploading attachments, clicking send).
    async fn submit(&self, prompt: &str, options: &CallOptions) -> Result<(), TransportError>;

    /// Take one observation of the rendered response.
    async fn sample(&self) -> Result<Sample, TransportError>;

    /// Extract the final response text.
    async fn extract(&self) -> Result<String, TransportError>;

    /// Surface name for logging.
    fn name(&self) -> &str {
        "surface"
    }
}

/// A [`Transport`] that submits through a [`ResponseSurface`] and polls
/// it until the completion detector fires or the attempt budget runs out.
///
/// Polling is cooperative: the loop yields between samples via
/// `tokio::time::sleep`. There is no mid-call cancellation; the attempt
/// budget is the only bound on a call.
pub struct SurfaceTransport<S: ResponseSurface> {
    surface: S,
    poll: PollConfig,
}

impl<S: ResponseSurface> SurfaceTransport<S> {
    /// Create a transport with default polling parameters (1 s interval,
    /// 90 attempts, stability of 2).
    pub fn new(surface: S) -> Self {
        Self::with_poll_config(surface, PollConfig::default())
    }

    /// Create a transport with custom polling parameters.
    pub fn with_poll_config(surface: S, poll: PollConfig) -> Self {
        Self { surface, poll }
    }

    /// Access the underlying surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[async_trait::async_trait]
impl<S: ResponseSurface> Transport for SurfaceTransport<S> {
    async fn call(&self, prompt: &str, options: &CallOptions) -> Result<String, TransportError> {
        self.surface.submit(prompt, options).await?;

        let mut detector = CompletionDetector::from_config(&self.poll);
        for _ in 0..self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval()).await;

            let sample = self.surface.sample().await?;
            if detector.observe(&sample) {
                break;
            }
        }

        // One final extraction regardless of how the loop ended; an
        // empty extraction is a failure, never an empty success.
        let text = self.surface.extract().await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(TransportError::EmptyResponse);
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        self.surface.name()
    }
}
