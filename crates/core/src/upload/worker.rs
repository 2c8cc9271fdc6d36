//! Chunk upload worker
//!
//! Uploads exactly one part. Each attempt fetches a fresh presigned URL,
//! PUTs the raw bytes, then registers the part's MD5 with the server.
//! Attempts follow a fixed delay table rather than the dispatcher's
//! exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use conduit_common::retry::{RetryBudget, RetrySpan};
use conduit_domain::constants::PART_RETRY_DELAYS_MS;
use conduit_domain::{AddPartState, ConduitError, PartPresignedUrl, Result};
use tracing::{debug, instrument};

use super::api;
use super::digest::md5_hex;
use crate::ports::{PartTransfer, RestDispatcher};

/// Everything one worker invocation needs to upload a part.
#[derive(Debug, Clone)]
pub struct PartUpload {
    pub upload_id: String,
    pub part_number: u32,
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// URL from the batch call, used by the first attempt only.
    pub initial_url: Option<PartPresignedUrl>,
}

/// Server acknowledgement of an added part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartAck {
    pub part_number: u32,
    pub md5_hex: String,
    pub attempts: u32,
}

pub struct ChunkUploadWorker {
    dispatcher: Arc<dyn RestDispatcher>,
    transfer: Arc<dyn PartTransfer>,
    retry_delays: Vec<Duration>,
}

impl ChunkUploadWorker {
    pub fn new(dispatcher: Arc<dyn RestDispatcher>, transfer: Arc<dyn PartTransfer>) -> Self {
        Self {
            dispatcher,
            transfer,
            retry_delays: PART_RETRY_DELAYS_MS.iter().copied().map(Duration::from_millis).collect(),
        }
    }

    /// Replace the per-attempt delay table; its length is the attempt count.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        if !delays.is_empty() {
            self.retry_delays = delays;
        }
        self
    }

    /// Upload one part, retrying locally.
    ///
    /// # Errors
    /// - `IntegrityMismatch` as soon as the server rejects the digest
    /// - `PartUploadFailed` once every attempt has failed
    #[instrument(skip(self, part), fields(upload_id = %part.upload_id, part_number = part.part_number))]
    pub async fn upload(&self, mut part: PartUpload) -> Result<PartAck> {
        let md5_hex = md5_hex(&part.bytes);
        let mut budget = RetryBudget::fixed(self.retry_delays.clone());
        let span = RetrySpan::new(format!("upload part {}", part.part_number), budget.max_attempts());
        let mut last_error = None;

        while let Some(attempt) = budget.acquire().await {
            let url = part.initial_url.take();
            match self.attempt(&part, url, &md5_hex).await {
                Ok(()) => {
                    span.record_recovered(attempt);
                    return Ok(PartAck { part_number: part.part_number, md5_hex, attempts: attempt });
                }
                Err(err @ ConduitError::IntegrityMismatch { .. }) => return Err(err),
                Err(err) => {
                    span.record_failure(attempt, &err.to_string());
                    last_error = Some(err);
                }
            }
        }

        let cause = last_error.map_or_else(|| "no attempts were made".to_string(), |e| e.to_string());
        span.record_exhausted(budget.total_delay(), &cause);
        Err(ConduitError::PartUploadFailed { part_number: part.part_number, cause })
    }

    async fn attempt(
        &self,
        part: &PartUpload,
        url: Option<PartPresignedUrl>,
        md5_hex: &str,
    ) -> Result<()> {
        let url = match url {
            Some(url) => url,
            None => self.refresh_url(part).await?,
        };
        let content_type = url.signed_content_type().unwrap_or(&part.content_type);

        self.transfer.put_part(&url.upload_presigned_url, content_type, &part.bytes).await?;
        debug!(bytes = part.bytes.len(), "part bytes transferred");

        let response =
            api::add_part(self.dispatcher.as_ref(), &part.upload_id, part.part_number, md5_hex)
                .await?;
        match response.add_part_state {
            AddPartState::AddSuccess => Ok(()),
            AddPartState::AddFailed => Err(ConduitError::IntegrityMismatch {
                part_number: part.part_number,
                message: response
                    .error_message
                    .unwrap_or_else(|| format!("server rejected MD5 {md5_hex}")),
            }),
        }
    }

    async fn refresh_url(&self, part: &PartUpload) -> Result<PartPresignedUrl> {
        let urls = api::presigned_urls(
            self.dispatcher.as_ref(),
            &part.upload_id,
            &part.content_type,
            vec![part.part_number],
        )
        .await?;
        urls.into_iter().find(|url| url.part_number == part.part_number).ok_or_else(|| {
            ConduitError::Internal(format!(
                "presigned URL batch did not include part {}",
                part.part_number
            ))
        })
    }
}
