//! Completion detection for a continuously re-rendering response.
//!
//! There is no "generation finished" event on a scraped channel, only
//! a text surface that keeps mutating until the model is done. Two
//! signals are required before a response counts as complete: the
//! extracted text must hold still across consecutive samples, and the
//! surface must show its end-of-turn footer. Stability alone is not
//! safe: intermediate "thinking" sections can render, hold still, and
//! then be replaced before the real output begins.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One observation of the rendered response surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Text extracted from the surface at this instant.
    pub text: String,
    /// Whether the end-of-turn footer (action controls) is rendered.
    pub footer_visible: bool,
}

impl Sample {
    /// Convenience constructor.
    pub fn new(text: impl Into<String>, footer_visible: bool) -> Self {
        Self {
            text: text.into(),
            footer_visible,
        }
    }
}

/// Polling parameters for the completion loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between samples, in milliseconds.
    pub interval_ms: u64,
    /// Maximum number of samples before giving up.
    pub max_attempts: u32,
    /// Consecutive identical samples (baseline included) required
    /// before the text is considered stable.
    pub required_stable: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            max_attempts: 90,
            required_stable: 2,
        }
    }
}

impl PollConfig {
    /// Delay between samples.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Upper bound on total polling time.
    pub fn budget(&self) -> Duration {
        self.interval() * self.max_attempts
    }
}

/// Tracks sample-to-sample stability and decides completion.
///
/// The stability counter counts consecutive samples with identical
/// non-empty text, the baseline observation included: a newly seen
/// text starts the counter at 1, each repeat increments it, and any
/// change re-baselines. Empty text never accumulates stability.
#[derive(Debug, Clone)]
pub struct CompletionDetector {
    required_stable: u32,
    baseline: String,
    stable_count: u32,
}

impl CompletionDetector {
    /// Create a detector requiring `required_stable` consecutive
    /// identical samples.
    pub fn new(required_stable: u32) -> Self {
        Self {
            required_stable,
            baseline: String::new(),
            stable_count: 0,
        }
    }

    /// Create a detector from a poll configuration.
    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(config.required_stable)
    }

    /// Feed one sample; returns true when the response is complete.
    ///
    /// Complete means both signals hold at once: the stability counter
    /// has reached the threshold and the footer is visible.
    pub fn observe(&mut self, sample: &Sample) -> bool {
        if sample.text == self.baseline && !sample.text.is_empty() {
            self.stable_count += 1;
        } else {
            self.baseline = sample.text.clone();
            self.stable_count = if sample.text.is_empty() { 0 } else { 1 };
        }

        sample.footer_visible && self.stable_count >= self.required_stable
    }

    /// Current stability counter, for diagnostics.
    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert_eq!(config.max_attempts, 90);
        assert_eq!(config.required_stable, 2);
        assert_eq!(config.budget(), Duration::from_secs(90));
    }

    #[test]
    fn test_completion_declared_at_expected_tick() {
        // Stream: ["", "partial", "partial", "final", "final", "final"],
        // footer from index 3 onward, stability requirement 2.
        // Completion must land at index 4: "final" has repeated twice
        // and the footer is present. Not earlier.
        let samples = [
            Sample::new("", false),
            Sample::new("partial", false),
            Sample::new("partial", false),
            Sample::new("final", true),
            Sample::new("final", true),
            Sample::new("final", true),
        ];

        let mut detector = CompletionDetector::new(2);
        let completed_at = samples
            .iter()
            .position(|s| detector.observe(s))
            .expect("stream should complete");

        assert_eq!(completed_at, 4);
    }

    #[test]
    fn test_stability_alone_is_not_completion() {
        let mut detector = CompletionDetector::new(2);

        assert!(!detector.observe(&Sample::new("text", false)));
        assert!(!detector.observe(&Sample::new("text", false)));
        assert!(!detector.observe(&Sample::new("text", false)));
        assert!(detector.stable_count() >= 2);

        // Footer arriving while text is still stable completes.
        assert!(detector.observe(&Sample::new("text", true)));
    }

    #[test]
    fn test_footer_alone_is_not_completion() {
        let mut detector = CompletionDetector::new(2);

        assert!(!detector.observe(&Sample::new("a", true)));
        assert!(!detector.observe(&Sample::new("b", true)));
        assert!(!detector.observe(&Sample::new("c", true)));
    }

    #[test]
    fn test_changed_text_resets_stability() {
        let mut detector = CompletionDetector::new(3);

        detector.observe(&Sample::new("a", false));
        detector.observe(&Sample::new("a", false));
        assert_eq!(detector.stable_count(), 2);

        detector.observe(&Sample::new("b", false));
        assert_eq!(detector.stable_count(), 1);
    }

    #[test]
    fn test_empty_text_never_accumulates() {
        let mut detector = CompletionDetector::new(1);

        assert!(!detector.observe(&Sample::new("", true)));
        assert!(!detector.observe(&Sample::new("", true)));
        assert_eq!(detector.stable_count(), 0);
    }
}
