use std::time::Duration;

use conduit_common::retry::{RetryBudget, RetrySpan};
use conduit_domain::constants::{DEFAULT_HTTP_TIMEOUT_MS, DISPATCH_BASE_DELAY_MS, MAX_DISPATCH_ATTEMPTS};
use conduit_domain::{ConduitError, HttpConfig};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::errors::{reason_text, InfraError};

/// HTTP client that retries transient failures with exponential backoff.
///
/// Only two signals count as transient: a `503 Service Unavailable`
/// response and a request that timed out. Everything else, including other
/// 5xx statuses and connection failures, is returned on the first attempt.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: u32,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ConduitError> {
        Self::builder().build()
    }

    pub fn from_config(config: &HttpConfig, user_agent: impl Into<String>) -> Result<Self, ConduitError> {
        Self::builder()
            .timeout(config.timeout())
            .max_attempts(config.max_attempts)
            .base_backoff(config.base_backoff())
            .user_agent(user_agent)
            .build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Non-2xx responses other than 503 are returned as `Ok`; mapping them
    /// is the caller's concern.
    ///
    /// # Errors
    /// - `ServiceUnavailable` once every attempt met a transient signal
    /// - the mapped reqwest error for any other transport failure
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ConduitError> {
        // `try_clone` is also `None` when the builder holds an error; build
        // once so that error comes back instead.
        let Some(template) = builder.try_clone() else {
            return Err(match builder.build() {
                Err(err) => InfraError::from(err).into(),
                Ok(_) => ConduitError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                ),
            });
        };

        let mut budget = RetryBudget::exponential(self.max_attempts, self.base_backoff);
        let span = RetrySpan::new("http request", budget.max_attempts());
        let mut last_cause = String::new();

        while let Some(delay) = budget.next_attempt() {
            let attempt = budget.attempts_made();
            span.record_attempt(attempt, delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let cloned_builder = template.try_clone().ok_or_else(|| {
                ConduitError::Internal("request builder could not be cloned".into())
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                ConduitError::from(infra)
            })?;

            let method = request.method().clone();
            let url = redact_query(request.url());
            debug!(attempt, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) if response.status() == StatusCode::SERVICE_UNAVAILABLE => {
                    let body = response.text().await.unwrap_or_default();
                    let reason = reason_text(&body, "Service Unavailable");
                    last_cause = format!("{method} {url} returned 503: {reason}");
                    span.record_failure(attempt, &last_cause);
                }
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");
                    span.record_recovered(attempt);
                    return Ok(response);
                }
                Err(err) if err.is_timeout() => {
                    last_cause = format!("{method} {url} timed out");
                    span.record_failure(attempt, &last_cause);
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");
                    let infra: InfraError = err.into();
                    return Err(ConduitError::from(infra));
                }
            }
        }

        span.record_exhausted(budget.total_delay(), &last_cause);
        Err(ConduitError::ServiceUnavailable { attempts: budget.attempts_made(), cause: last_cause })
    }
}

/// Presigned URLs carry credentials in the query string.
fn redact_query(url: &reqwest::Url) -> String {
    let mut shown = url.clone();
    if shown.query().is_some() {
        shown.set_query(Some("…"));
    }
    shown.to_string()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            max_attempts: MAX_DISPATCH_ATTEMPTS,
            base_backoff: Duration::from_millis(DISPATCH_BASE_DELAY_MS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, ConduitError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            ConduitError::from(infra)
        })?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}
