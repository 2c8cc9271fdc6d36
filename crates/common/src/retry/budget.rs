// Per-call attempt budget
use std::time::Duration;

use super::backoff::Backoff;
use super::constants::MIN_MAX_ATTEMPTS;

/// Attempt counter scoped to a single logical operation.
///
/// Created fresh for every dispatcher call or part upload and never shared,
/// so concurrent callers cannot drain each other's attempts.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    attempts_made: u32,
    max_attempts: u32,
    backoff: Backoff,
    total_delay: Duration,
}

impl RetryBudget {
    /// Create a budget allowing `max_attempts` tries (at least one).
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: max_attempts.max(MIN_MAX_ATTEMPTS),
            backoff,
            total_delay: Duration::ZERO,
        }
    }

    /// Exponential backoff starting at `base_delay`.
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::exponential(base_delay))
    }

    /// One attempt per entry of `delays`, each preceded by its delay.
    pub fn fixed(delays: Vec<Duration>) -> Self {
        let max_attempts = u32::try_from(delays.len()).unwrap_or(u32::MAX);
        Self::new(max_attempts, Backoff::schedule(delays))
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.backoff.base_delay()
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts - self.attempts_made
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }

    /// Sum of the delays handed out so far.
    pub fn total_delay(&self) -> Duration {
        self.total_delay
    }

    /// Claim the next attempt.
    ///
    /// Returns the delay to wait before running it, or `None` once every
    /// attempt has been used.
    pub fn next_attempt(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts_made += 1;
        let delay = self.backoff.delay_before(self.attempts_made);
        self.total_delay = self.total_delay.saturating_add(delay);
        Some(delay)
    }

    /// Claim the next attempt and sleep through its delay.
    ///
    /// Returns the 1-based attempt number, or `None` when exhausted.
    #[cfg(feature = "runtime")]
    pub async fn acquire(&mut self) -> Option<u32> {
        let delay = self.next_attempt()?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Some(self.attempts_made)
    }
}
