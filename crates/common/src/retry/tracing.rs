//! Structured logging for retry loops
//!
//! Thin wrapper over the `tracing` macros so every retry loop reports the
//! same field names.

use std::time::Duration;

use tracing::{debug, warn};

/// Log context for one retried operation
pub struct RetrySpan {
    operation_name: String,
    max_attempts: u32,
}

impl RetrySpan {
    pub fn new(operation_name: impl Into<String>, max_attempts: u32) -> Self {
        Self { operation_name: operation_name.into(), max_attempts }
    }

    /// Record an attempt
    pub fn record_attempt(&self, attempt: u32, delay: Duration) {
        if delay.is_zero() {
            debug!(operation = %self.operation_name, attempt, "attempt");
        } else {
            debug!(
                operation = %self.operation_name,
                attempt,
                delay_ms = delay.as_millis(),
                "attempt after backoff"
            );
        }
    }

    /// Record a retryable failure
    pub fn record_failure(&self, attempt: u32, error: &str) {
        warn!(
            operation = %self.operation_name,
            attempt,
            max_attempts = self.max_attempts,
            error = %error,
            "attempt failed, will retry if budget allows"
        );
    }

    /// Record that all attempts have been exhausted
    pub fn record_exhausted(&self, total_delay: Duration, error: &str) {
        warn!(
            operation = %self.operation_name,
            max_attempts = self.max_attempts,
            total_delay_ms = total_delay.as_millis(),
            error = %error,
            "all attempts exhausted"
        );
    }

    /// Record success after at least one retry
    pub fn record_recovered(&self, attempts: u32) {
        if attempts > 1 {
            debug!(operation = %self.operation_name, attempts, "succeeded after retry");
        }
    }
}
