//! Client facade
//!
//! [`ConduitClient`] wires the signed dispatcher, the presigned transfer and
//! the core engines together from one [`ClientConfig`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use conduit_core::jobs::{JobCoordinator, JobRequest};
use conduit_core::ports::RestDispatcher;
use conduit_core::upload::MultipartUploader;
use conduit_domain::{ClientConfig, FileHandle, JobToken, Result, UploadMetadata};
use tracing::{info, instrument};

use crate::api::{PresignedTransfer, SignedDispatcher};
use crate::source::FileSource;

/// Per-upload settings for [`ConduitClient::upload_file`].
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub metadata: UploadMetadata,
    pub storage_location_id: Option<i64>,
    /// Start a fresh session even if the server holds a resumable one.
    pub force_restart: bool,
}

impl UploadOptions {
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.metadata.content_type = content_type.into();
        self
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.metadata.file_name = Some(file_name.into());
        self
    }

    pub fn storage_location(mut self, id: i64) -> Self {
        self.storage_location_id = Some(id);
        self
    }

    pub fn force_restart(mut self) -> Self {
        self.force_restart = true;
        self
    }
}

/// Entry point for uploads and asynchronous jobs.
pub struct ConduitClient {
    config: ClientConfig,
    dispatcher: Arc<SignedDispatcher>,
    uploader: MultipartUploader,
    jobs: JobCoordinator,
}

impl ConduitClient {
    /// # Errors
    /// Returns `ConduitError::Config` if `config` fails validation.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let dispatcher = Arc::new(SignedDispatcher::from_config(&config)?);
        let transfer = Arc::new(PresignedTransfer::new(&config.http)?);
        let shared: Arc<dyn RestDispatcher> = dispatcher.clone();

        let uploader = MultipartUploader::new(shared.clone(), transfer, config.upload.clone());
        let jobs = JobCoordinator::from_config(shared, &config.jobs);

        info!(repo = %config.endpoints.repo, signed = config.credentials.is_some(), "Conduit client ready");
        Ok(Self { config, dispatcher, uploader, jobs })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The dispatcher, for REST calls outside the engines.
    pub fn dispatcher(&self) -> Arc<SignedDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Upload the file at `path` and return its handle.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn upload_file(&self, path: impl AsRef<Path>, options: UploadOptions) -> Result<FileHandle> {
        let source = Arc::new(FileSource::open(path.as_ref()).await?);
        self.uploader
            .upload(source, &options.metadata, options.storage_location_id, options.force_restart)
            .await
    }

    pub async fn start_job<R: JobRequest>(&self, request: &R) -> Result<JobToken> {
        self.jobs.start(request).await
    }

    /// One poll; `ConduitError::NotReady` while the job is still running.
    pub async fn poll_job<R: JobRequest>(&self, request: &R, token: &JobToken) -> Result<R::Response> {
        self.jobs.poll(request, token).await
    }

    /// Start `request` and poll until it finishes or `timeout` passes.
    ///
    /// `None` uses `jobs.default_timeout_ms`.
    pub async fn wait_for_job<R: JobRequest>(
        &self,
        request: &R,
        timeout: Option<Duration>,
    ) -> Result<R::Response> {
        let timeout = timeout.unwrap_or_else(|| self.config.jobs.default_timeout());
        self.jobs.wait_for(request, timeout).await
    }

    pub async fn cancel_job(&self, token: &JobToken) -> Result<()> {
        self.jobs.cancel(token).await
    }
}
