//! Shared utilities for the Conduit crates.
//!
//! # Feature Tiers
//!
//! - default: retry budgets and backoff schedules (no async runtime)
//! - `runtime`: async sleeping between attempts (`RetryBudget::acquire`)
//! - `observability`: `tracing-subscriber` bootstrap for binaries and tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod retry;

#[cfg(feature = "observability")]
pub mod observability;

pub use retry::{Backoff, RetryBudget, RetrySpan};
