//! Observability for mail sending.
//!
//! Counters are observational only; they never affect control flow.

use std::sync::atomic::{AtomicU64, Ordering};

/// Mail sending metrics collector.
#[derive(Debug, Default)]
pub struct MailerMetrics {
    /// Sends that reached terminal success.
    pub sends_succeeded: AtomicU64,
    /// Sends that reached a terminal failure.
    pub sends_failed: AtomicU64,
    /// Individual delivery attempts, across all sends.
    pub delivery_attempts: AtomicU64,
    /// Template renders performed for HTML bodies.
    pub templates_rendered: AtomicU64,
}

impl MailerMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a terminally successful send.
    pub fn record_send_success(&self) {
        self.sends_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a terminally failed send.
    pub fn record_send_failure(&self) {
        self.sends_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one delivery attempt.
    pub fn record_attempt(&self) {
        self.delivery_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a template render.
    pub fn record_template_render(&self) {
        self.templates_rendered.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of delivery attempts recorded so far.
    pub fn attempts(&self) -> u64 {
        self.delivery_attempts.load(Ordering::Relaxed)
    }

    /// Returns the number of template renders recorded so far.
    pub fn templates_rendered(&self) -> u64 {
        self.templates_rendered.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = MailerMetrics::new();
        metrics.record_attempt();
        metrics.record_attempt();
        metrics.record_send_failure();

        assert_eq!(metrics.attempts(), 2);
        assert_eq!(metrics.sends_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.sends_succeeded.load(Ordering::Relaxed), 0);
    }
}
