//! Subscriber installation

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("a global subscriber is already installed")]
    AlreadyInitialized,
}

/// Install a global fmt subscriber filtered by `RUST_LOG`.
///
/// `filter` overrides the environment when given. Calling this twice
/// returns [`LoggingError::AlreadyInitialized`] instead of panicking.
pub fn init_tracing(format: LogFormat, filter: Option<&str>) -> Result<(), LoggingError> {
    let filter = build_filter(filter)?;

    match format {
        LogFormat::Text => {
            let layer = fmt::layer().with_target(true);
            install(tracing_subscriber::registry().with(filter).with(layer))
        }
        LogFormat::Json => {
            let layer = fmt::layer().json().with_ansi(false).with_current_span(true);
            install(tracing_subscriber::registry().with(filter).with(layer))
        }
    }
}

fn build_filter(filter: Option<&str>) -> Result<EnvFilter, LoggingError> {
    match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|_| LoggingError::InvalidFilter(directives.to_string())),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

fn install<S>(subscriber: S) -> Result<(), LoggingError>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber.try_init().map_err(|_| LoggingError::AlreadyInitialized)
}
