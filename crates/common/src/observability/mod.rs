//! Observability bootstrap
//!
//! Library code only emits `tracing` events; binaries and tests call
//! [`init_tracing`] once to install a subscriber.

pub mod logging;

pub use logging::{init_tracing, LogFormat, LoggingError, DEFAULT_FILTER};
