//! Asynchronous job wire types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_state_conversions;

/// Server-reported state of a long-running job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    #[default]
    Processing,
    Complete,
    Failed,
    Cancelled,
}

impl_state_conversions!(JobState {
    Processing => "PROCESSING",
    Complete => "COMPLETE",
    Failed => "FAILED",
    Cancelled => "CANCELLED",
});

impl JobState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }

    /// FAILED and CANCELLED both end a job without a result.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }
}

/// Status body returned by a poll while no result is available.
///
/// `jobState` is required so that a result payload is never mistaken for a
/// status. Re-fetched on every poll and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(alias = "state")]
    pub job_state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, alias = "errorDetail", skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_current: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_total: Option<u64>,
}

impl JobStatus {
    /// One-line description used in error messages.
    pub fn summary(&self) -> String {
        match (&self.error_message, &self.error_details) {
            (Some(message), Some(details)) => format!("{}: {message} ({details})", self.job_state),
            (Some(message), None) => format!("{}: {message}", self.job_state),
            _ => self.job_state.to_string(),
        }
    }
}

/// Opaque handle returned by a job start call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobToken(String);

impl JobToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Body of a successful start call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncJobId {
    pub token: String,
}
