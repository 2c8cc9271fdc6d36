//! Client configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTH_ENDPOINT, DEFAULT_FILE_ENDPOINT, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_JOB_TIMEOUT_MS, DEFAULT_REPO_ENDPOINT, DEFAULT_UPLOAD_CONCURRENCY,
    DISPATCH_BASE_DELAY_MS, JOB_POLL_INTERVAL_MS, MAX_DISPATCH_ATTEMPTS, MAX_NUMBER_OF_PARTS,
    MIN_PART_SIZE, PART_RETRY_DELAYS_MS,
};
use crate::errors::{ConduitError, Result};
use crate::types::Endpoint;

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoints: EndpointConfig,
    pub credentials: Option<Credentials>,
    pub session_token: Option<String>,
    pub user_agent: Option<String>,
    pub http: HttpConfig,
    pub upload: UploadConfig,
    pub jobs: JobConfig,
}

impl ClientConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.endpoints.validate()?;
        if self.http.max_attempts == 0 {
            return Err(ConduitError::Config("http.max_attempts must be at least 1".into()));
        }
        if self.upload.concurrency == 0 {
            return Err(ConduitError::Config("upload.concurrency must be at least 1".into()));
        }
        if self.upload.part_retry_delays_ms.is_empty() {
            return Err(ConduitError::Config(
                "upload.part_retry_delays_ms needs one entry per attempt".into(),
            ));
        }
        if self.upload.min_part_size < MIN_PART_SIZE {
            return Err(ConduitError::Config(format!(
                "upload.min_part_size must be at least {MIN_PART_SIZE} bytes"
            )));
        }
        if self.upload.max_parts == 0 {
            return Err(ConduitError::Config("upload.max_parts must be at least 1".into()));
        }
        if let Some(credentials) = &self.credentials {
            if credentials.user_name.trim().is_empty() {
                return Err(ConduitError::Config("credentials.user_name is empty".into()));
            }
        }
        Ok(())
    }

    /// `User-Agent` sent with every request.
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("conduit/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Base URLs of the three REST roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub repo: String,
    pub file: String,
    pub auth: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO_ENDPOINT.to_string(),
            file: DEFAULT_FILE_ENDPOINT.to_string(),
            auth: DEFAULT_AUTH_ENDPOINT.to_string(),
        }
    }
}

impl EndpointConfig {
    /// Point all three roots at one host, as test servers do.
    pub fn single_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            repo: format!("{base}/repo/v1"),
            file: format!("{base}/file/v1"),
            auth: format!("{base}/auth/v1"),
        }
    }

    pub fn url_for(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Repo => &self.repo,
            Endpoint::File => &self.file,
            Endpoint::Auth => &self.auth,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [("repo", &self.repo), ("file", &self.file), ("auth", &self.auth)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConduitError::Config(format!(
                    "endpoints.{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }
}

/// API-key credentials used to sign requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user_name: String,
    /// Base64-encoded shared secret.
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    /// Total attempts per dispatch, including the first.
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            max_attempts: MAX_DISPATCH_ATTEMPTS,
            base_backoff_ms: DISPATCH_BASE_DELAY_MS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Parts in flight at once.
    pub concurrency: usize,
    pub part_retry_delays_ms: Vec<u64>,
    pub min_part_size: u64,
    pub max_parts: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            part_retry_delays_ms: PART_RETRY_DELAYS_MS.to_vec(),
            min_part_size: MIN_PART_SIZE,
            max_parts: MAX_NUMBER_OF_PARTS,
        }
    }
}

impl UploadConfig {
    pub fn part_retry_delays(&self) -> Vec<Duration> {
        self.part_retry_delays_ms.iter().copied().map(Duration::from_millis).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub poll_interval_ms: u64,
    pub default_timeout_ms: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self { poll_interval_ms: JOB_POLL_INTERVAL_MS, default_timeout_ms: DEFAULT_JOB_TIMEOUT_MS }
    }
}

impl JobConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}
