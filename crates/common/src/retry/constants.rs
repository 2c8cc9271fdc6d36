// Constants for retry module
use std::time::Duration;

/// Default maximum number of attempts (initial try included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default base delay for exponential backoff
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Maximum doubling exponent, keeps the multiplier within u32
pub const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Minimum allowed max_attempts value
pub const MIN_MAX_ATTEMPTS: u32 = 1;
