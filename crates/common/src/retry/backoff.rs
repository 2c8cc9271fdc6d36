//! Delay schedules between attempts

use std::time::Duration;

use super::constants::MAX_BACKOFF_EXPONENT;

/// How long to wait before each attempt.
///
/// Attempts are 1-based. The first attempt of an exponential schedule never
/// waits; a fixed schedule states every delay explicitly, first included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// `base`, `2 * base`, `4 * base`, ... before attempts 2, 3, 4, ...
    Exponential { base: Duration },
    /// Delay before attempt `n` is entry `n - 1`; the last entry repeats.
    Schedule(Vec<Duration>),
}

impl Backoff {
    pub fn exponential(base: Duration) -> Self {
        Self::Exponential { base }
    }

    pub fn schedule(delays: impl Into<Vec<Duration>>) -> Self {
        Self::Schedule(delays.into())
    }

    /// Delay to sleep before running `attempt`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        match self {
            Self::Exponential { base } => {
                if attempt <= 1 {
                    return Duration::ZERO;
                }
                let exponent = (attempt - 2).min(MAX_BACKOFF_EXPONENT);
                base.saturating_mul(1u32 << exponent)
            }
            Self::Schedule(delays) => {
                let index = attempt.saturating_sub(1) as usize;
                delays.get(index).or_else(|| delays.last()).copied().unwrap_or(Duration::ZERO)
            }
        }
    }

    /// Base delay of the schedule, reported in logs.
    pub fn base_delay(&self) -> Duration {
        match self {
            Self::Exponential { base } => *base,
            Self::Schedule(delays) => {
                delays.iter().copied().find(|delay| !delay.is_zero()).unwrap_or(Duration::ZERO)
            }
        }
    }
}
