//! Conversions from external infrastructure errors into domain errors.

use conduit_domain::ConduitError;
use reqwest::Error as HttpError;
use serde::Deserialize;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ConduitError);

impl From<InfraError> for ConduitError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ConduitError> for InfraError {
    fn from(value: ConduitError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoConduitError {
    fn into_conduit(self) -> ConduitError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ConduitError */
/* -------------------------------------------------------------------------- */

impl IntoConduitError for HttpError {
    fn into_conduit(self) -> ConduitError {
        if self.is_timeout() {
            return ConduitError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ConduitError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return ConduitError::InvalidArgument(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return ConduitError::Serialization(format!("undecodable HTTP body: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status").to_string(),
            );
        }

        ConduitError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_conduit())
    }
}

/* -------------------------------------------------------------------------- */
/* toml / std::io → ConduitError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(ConduitError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        let message = value.to_string();
        InfraError(match value.kind() {
            std::io::ErrorKind::NotFound => ConduitError::NotFound(message),
            _ => ConduitError::Io(message),
        })
    }
}

/// Map a non-2xx, non-transient HTTP status onto the error taxonomy.
pub(crate) fn status_error(status: u16, reason: String) -> ConduitError {
    match status {
        401 | 403 => ConduitError::Auth(format!("HTTP {status}: {reason}")),
        404 => ConduitError::NotFound(reason),
        400..=499 => ConduitError::Client { status, reason },
        _ => ConduitError::Server { status, reason },
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    reason: String,
}

/// Server-supplied reason: the JSON `reason` field, else the raw body.
pub(crate) fn reason_text(body: &str, fallback: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.reason;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
