//! Error types used throughout the engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::job::JobStatus;

/// Main error type for Conduit
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ConduitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation invoked in a state that does not allow it (caller error).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-transient 4xx response.
    #[error("Request rejected (HTTP {status}): {reason}")]
    Client { status: u16, reason: String },

    /// Non-transient 5xx response.
    #[error("Server error (HTTP {status}): {reason}")]
    Server { status: u16, reason: String },

    /// Transient failures persisted through every dispatcher attempt.
    #[error("Service unavailable after {attempts} attempts: {cause}")]
    ServiceUnavailable { attempts: u32, cause: String },

    #[error("Job failed: {}", .0.summary())]
    JobFailed(JobStatus),

    /// Control signal: the job is still running.
    #[error("Job not ready: {}", .0.summary())]
    NotReady(JobStatus),

    #[error("Timed out after {waited_ms} ms waiting for job {token}")]
    Timeout { token: String, waited_ms: u64 },

    #[error("Part {part_number} failed to upload: {cause}")]
    PartUploadFailed { part_number: u32, cause: String },

    #[error("Integrity check failed for part {part_number}: {message}")]
    IntegrityMismatch { part_number: u32, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used for logging and caller-side policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Transient,
    Client,
    Job,
    Upload,
    Integrity,
    Configuration,
    Internal,
}

impl ConduitError {
    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ServiceUnavailable { .. } => ErrorCategory::Transient,
            // Only 503s and timeouts are retried; a plain 5xx or a refused
            // connection is reported as a request error.
            Self::InvalidArgument(_)
            | Self::InvalidState(_)
            | Self::Auth(_)
            | Self::NotFound(_)
            | Self::Network(_)
            | Self::Client { .. }
            | Self::Server { .. } => ErrorCategory::Client,
            Self::JobFailed(_) | Self::NotReady(_) | Self::Timeout { .. } => ErrorCategory::Job,
            Self::PartUploadFailed { .. } => ErrorCategory::Upload,
            Self::IntegrityMismatch { .. } => ErrorCategory::Integrity,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::Io(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a fresh attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    /// `true` for the "job still processing" signal.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }

    /// Short stable label for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidState(_) => "invalid_state",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::Client { .. } => "client",
            Self::Server { .. } => "server",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::JobFailed(_) => "job_failed",
            Self::NotReady(_) => "not_ready",
            Self::Timeout { .. } => "timeout",
            Self::PartUploadFailed { .. } => "part_upload_failed",
            Self::IntegrityMismatch { .. } => "integrity_mismatch",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for ConduitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ConduitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for Conduit operations
pub type Result<T> = std::result::Result<T, ConduitError>;
