//! Asynchronous job coordinator
//!
//! Start a job, poll it, or block until it finishes. A poll body is parsed
//! as the request's result type first and as a [`JobStatus`] second; the
//! status decides between `NotReady` and `JobFailed`.

use std::sync::Arc;
use std::time::Duration;

use conduit_domain::constants::JOB_POLL_INTERVAL_MS;
use conduit_domain::{
    AsyncJobId, ConduitError, Endpoint, JobConfig, JobState, JobStatus, JobToken, Result,
};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::request::JobRequest;
use crate::ports::{ApiRequest, RestDispatcher};

pub struct JobCoordinator {
    dispatcher: Arc<dyn RestDispatcher>,
    poll_interval: Duration,
}

impl JobCoordinator {
    pub fn new(dispatcher: Arc<dyn RestDispatcher>) -> Self {
        Self { dispatcher, poll_interval: Duration::from_millis(JOB_POLL_INTERVAL_MS) }
    }

    pub fn from_config(dispatcher: Arc<dyn RestDispatcher>, config: &JobConfig) -> Self {
        Self::new(dispatcher).with_poll_interval(config.poll_interval())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit `request` and return its job token.
    #[instrument(skip_all, fields(kind = %request.kind()))]
    pub async fn start<R: JobRequest>(&self, request: &R) -> Result<JobToken> {
        let kind = request.kind();
        let path = kind.start_path(request.entity_id())?;
        let api_request = ApiRequest::post(kind.endpoint(), path).with_json(request)?;

        let job: AsyncJobId = self.dispatcher.dispatch(api_request).await?.json()?;
        info!(token = %job.token, "async job started");
        Ok(JobToken::new(job.token))
    }

    /// Fetch the job's result once.
    ///
    /// # Errors
    /// - `NotReady` while the job is PROCESSING; poll again later
    /// - `JobFailed` once the job is FAILED or CANCELLED
    pub async fn poll<R: JobRequest>(&self, request: &R, token: &JobToken) -> Result<R::Response> {
        let kind = request.kind();
        let path = kind.poll_path(token, request.entity_id())?;
        let response = self.dispatcher.dispatch(ApiRequest::get(kind.endpoint(), path)).await?;
        interpret_poll_body(&response.body)
    }

    /// Start `request` and poll until it finishes or `timeout` elapses.
    ///
    /// Timing out stops client-side polling only; the job keeps running on
    /// the server unless [`cancel`](Self::cancel) is called.
    #[instrument(skip_all, fields(kind = %request.kind(), timeout_ms = timeout.as_millis()))]
    pub async fn wait_for<R: JobRequest>(&self, request: &R, timeout: Duration) -> Result<R::Response> {
        let token = self.start(request).await?;
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            polls += 1;
            match self.poll(request, &token).await {
                Err(ConduitError::NotReady(status)) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        warn!(%token, polls, "gave up waiting for async job");
                        return Err(ConduitError::Timeout {
                            token: token.to_string(),
                            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                        });
                    }
                    debug!(
                        %token,
                        polls,
                        progress_current = status.progress_current,
                        progress_total = status.progress_total,
                        "async job still processing"
                    );
                    tokio::time::sleep(self.poll_interval.min(timeout - waited)).await;
                }
                Ok(result) => {
                    info!(%token, polls, "async job complete");
                    return Ok(result);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Ask the server to cancel the job. Best effort.
    #[instrument(skip(self))]
    pub async fn cancel(&self, token: &JobToken) -> Result<()> {
        let path = format!("/asynchronous/job/{}/cancel", urlencoding::encode(token.as_str()));
        self.dispatcher.dispatch(ApiRequest::get(Endpoint::Repo, path)).await?;
        info!("async job cancellation requested");
        Ok(())
    }
}

/// Result first, then status: a malformed result whose body is not a status
/// either surfaces as a serialization error.
fn interpret_poll_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let result_err = match serde_json::from_str::<T>(body) {
        Ok(result) => return Ok(result),
        Err(err) => err,
    };

    match serde_json::from_str::<JobStatus>(body) {
        Ok(status) if status.job_state == JobState::Processing => Err(ConduitError::NotReady(status)),
        Ok(status) if status.job_state.is_failure() => Err(ConduitError::JobFailed(status)),
        Ok(_) => Err(ConduitError::Serialization(format!(
            "job reported COMPLETE but its result did not parse: {result_err}"
        ))),
        Err(_) => Err(ConduitError::Serialization(format!(
            "poll response is neither a result nor a job status: {result_err}"
        ))),
    }
}
