//! Retry primitives
//!
//! A [`RetryBudget`] counts attempts for exactly one operation and asks its
//! [`Backoff`] how long to wait before each one. Callers own the loop:
//!
//! ```rust
//! use std::time::Duration;
//! use conduit_common::retry::RetryBudget;
//!
//! let mut budget = RetryBudget::exponential(3, Duration::from_millis(10));
//! let mut attempts = 0;
//! while let Some(_delay) = budget.next_attempt() {
//!     attempts += 1;
//! }
//! assert_eq!(attempts, 3);
//! ```

pub mod backoff;
pub mod budget;
pub mod constants;
pub mod tracing;

pub use backoff::Backoff;
pub use budget::RetryBudget;
pub use constants::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
pub use self::tracing::RetrySpan;
