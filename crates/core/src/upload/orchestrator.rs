//! Multipart upload orchestrator
//!
//! Drives one upload through INITIATED → PLANNED → UPLOADING → COMPLETE.
//! The server's `partsState` is authoritative: parts it already holds are
//! marked UPLOADED at start and never sent again, which is what makes an
//! abandoned upload resumable.

use std::sync::Arc;

use conduit_domain::{
    ConduitError, FileHandle, MultipartState, MultipartUploadRequest, PartState, Result,
    UploadConfig, UploadMetadata, UploadSession, UploadState,
};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::digest::{digest_range, digest_source, md5_hex};
use super::planner::{choose_part_size, split_parts};
use super::worker::{ChunkUploadWorker, PartAck, PartUpload};
use super::api;
use crate::ports::{PartTransfer, RestDispatcher, UploadSource};

pub struct MultipartUploader {
    dispatcher: Arc<dyn RestDispatcher>,
    worker: Arc<ChunkUploadWorker>,
    config: UploadConfig,
}

impl MultipartUploader {
    pub fn new(
        dispatcher: Arc<dyn RestDispatcher>,
        transfer: Arc<dyn PartTransfer>,
        config: UploadConfig,
    ) -> Self {
        let worker = ChunkUploadWorker::new(Arc::clone(&dispatcher), transfer)
            .with_retry_delays(config.part_retry_delays());
        Self { dispatcher, worker: Arc::new(worker), config }
    }

    /// Upload `source` end to end and return the stored file's handle.
    pub async fn upload(
        &self,
        source: Arc<dyn UploadSource>,
        metadata: &UploadMetadata,
        storage_location_id: Option<i64>,
        force_restart: bool,
    ) -> Result<FileHandle> {
        let mut session =
            self.start(source.as_ref(), metadata, storage_location_id, force_restart).await?;
        if session.state != UploadState::Complete {
            self.plan(&mut session, source.as_ref()).await?;
            self.run_parts(&mut session, source).await?;
        }
        self.complete(&mut session).await
    }

    /// Initiate (or resume) an upload session on the server.
    ///
    /// Unless `force_restart` is set, the server may hand back an existing
    /// session for the same file; its `partsState` decides which parts
    /// still need uploading.
    #[instrument(skip_all, fields(file_name = source.file_name(), force_restart = force_restart))]
    pub async fn start(
        &self,
        source: &dyn UploadSource,
        metadata: &UploadMetadata,
        storage_location_id: Option<i64>,
        force_restart: bool,
    ) -> Result<UploadSession> {
        let file_size = source.size();
        let part_size = choose_part_size(file_size, self.config.min_part_size, self.config.max_parts)?;
        let mut parts = split_parts(file_size, part_size)?;
        let content_md5 = digest_source(source).await?;
        let file_name = metadata.file_name.clone().unwrap_or_else(|| source.file_name().to_string());

        let request = MultipartUploadRequest {
            file_name: file_name.clone(),
            file_size_bytes: file_size,
            content_type: metadata.content_type.clone(),
            content_md5_hex: content_md5.clone(),
            part_size_bytes: part_size,
            storage_location_id,
            generate_preview: metadata.generate_preview,
        };
        let status = api::initiate(self.dispatcher.as_ref(), &request, force_restart).await?;

        let server_complete = status.state == MultipartState::Completed;
        for part in &mut parts {
            if server_complete || status.is_part_added(part.part_number) {
                part.state = PartState::Uploaded;
            }
        }

        let session = UploadSession {
            upload_id: status.upload_id,
            file_name,
            file_size,
            part_size,
            total_parts: u32::try_from(parts.len()).unwrap_or(u32::MAX),
            state: if server_complete { UploadState::Complete } else { UploadState::Initiated },
            storage_location_id,
            content_type: metadata.content_type.clone(),
            generate_preview: metadata.generate_preview,
            content_md5,
            parts,
            result_file_handle_id: status.result_file_handle_id,
        };

        info!(
            upload_id = %session.upload_id,
            total_parts = session.total_parts,
            already_uploaded = session.uploaded_count(),
            part_size,
            "multipart upload initiated"
        );
        Ok(session)
    }

    /// Digest every pending part and fetch all their URLs in one batch call.
    #[instrument(skip_all, fields(upload_id = %session.upload_id))]
    pub async fn plan(&self, session: &mut UploadSession, source: &dyn UploadSource) -> Result<()> {
        if session.state != UploadState::Initiated {
            return Err(ConduitError::InvalidState(format!(
                "cannot plan upload {} in state {}",
                session.upload_id, session.state
            )));
        }

        let mut pending = Vec::new();
        for part in session.parts.iter_mut().filter(|part| part.state != PartState::Uploaded) {
            part.digest = Some(digest_range(source, part.offset, part.length).await?);
            pending.push(part.part_number);
        }

        if !pending.is_empty() {
            let urls = api::presigned_urls(
                self.dispatcher.as_ref(),
                &session.upload_id,
                &session.content_type,
                pending.clone(),
            )
            .await?;
            for url in urls {
                if let Some(part) = session.part_mut(url.part_number) {
                    part.upload_url = Some(url);
                }
            }
        }

        session.state = UploadState::Planned;
        info!(pending_parts = pending.len(), "multipart upload planned");
        Ok(())
    }

    /// Upload every pending part through a bounded pool of workers.
    ///
    /// A failing part never cancels its siblings; all parts reach a terminal
    /// state before this returns. When several fail, the lowest part number
    /// is reported.
    #[instrument(skip_all, fields(upload_id = %session.upload_id))]
    pub async fn run_parts(
        &self,
        session: &mut UploadSession,
        source: Arc<dyn UploadSource>,
    ) -> Result<()> {
        if session.state != UploadState::Planned {
            return Err(ConduitError::InvalidState(format!(
                "cannot upload parts of {} in state {}",
                session.upload_id, session.state
            )));
        }
        session.state = UploadState::Uploading;

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut in_flight = FuturesUnordered::new();

        for part in session.parts.iter_mut().filter(|part| part.state != PartState::Uploaded) {
            let worker = Arc::clone(&self.worker);
            let source = Arc::clone(&source);
            let semaphore = Arc::clone(&semaphore);
            let upload_id = session.upload_id.clone();
            let content_type = session.content_type.clone();
            let (part_number, offset, length) = (part.part_number, part.offset, part.length);
            let planned_digest = part.digest.clone();
            let initial_url = part.upload_url.take();

            let handle: JoinHandle<Result<PartAck>> = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|err| ConduitError::Internal(format!("worker pool closed: {err}")))?;
                let bytes = source.read_range(offset, length).await?;
                if let Some(expected) = planned_digest {
                    let actual = md5_hex(&bytes);
                    if actual != expected {
                        return Err(ConduitError::IntegrityMismatch {
                            part_number,
                            message: format!(
                                "source changed since planning (expected {expected}, read {actual})"
                            ),
                        });
                    }
                }
                worker
                    .upload(PartUpload { upload_id, part_number, bytes, content_type, initial_url })
                    .await
            });
            // A task that dies still belongs to its part.
            in_flight.push(async move {
                let outcome = handle.await.unwrap_or_else(|err| {
                    Err(ConduitError::Internal(format!(
                        "upload task for part {part_number} aborted: {err}"
                    )))
                });
                (part_number, outcome)
            });
        }

        let mut failures: Vec<(u32, ConduitError)> = Vec::new();
        while let Some((part_number, outcome)) = in_flight.next().await {
            record_outcome(session, part_number, outcome, &mut failures);
        }

        if failures.is_empty() {
            info!(total_parts = session.total_parts, "all parts uploaded");
            return Ok(());
        }

        session.state = UploadState::Failed;
        failures.sort_by_key(|(part_number, _)| *part_number);
        let failed_parts: Vec<u32> = failures.iter().map(|(part_number, _)| *part_number).collect();
        error!(?failed_parts, "multipart upload failed; session remains resumable");
        let (part_number, err) = failures.swap_remove(0);
        Err(match err {
            err @ (ConduitError::PartUploadFailed { .. } | ConduitError::IntegrityMismatch { .. }) => err,
            other => ConduitError::PartUploadFailed { part_number, cause: other.to_string() },
        })
    }

    /// Finalize the upload and fetch the resulting file handle.
    ///
    /// Calling this again after success returns the same handle; the
    /// server-side complete call is idempotent as well.
    #[instrument(skip_all, fields(upload_id = %session.upload_id))]
    pub async fn complete(&self, session: &mut UploadSession) -> Result<FileHandle> {
        if !session.all_parts_uploaded() {
            return Err(ConduitError::InvalidState(format!(
                "upload {} has {} of {} parts uploaded; cannot complete",
                session.upload_id,
                session.uploaded_count(),
                session.total_parts
            )));
        }

        let file_handle_id = match session.result_file_handle_id.clone() {
            Some(id) if session.state == UploadState::Complete => id,
            _ => {
                let status = api::complete(self.dispatcher.as_ref(), &session.upload_id).await?;
                if status.state != MultipartState::Completed {
                    return Err(ConduitError::InvalidState(format!(
                        "server reports upload {} still in progress after complete",
                        session.upload_id
                    )));
                }
                status.result_file_handle_id.ok_or_else(|| {
                    ConduitError::Internal(format!(
                        "completed upload {} returned no file handle id",
                        session.upload_id
                    ))
                })?
            }
        };

        session.result_file_handle_id = Some(file_handle_id.clone());
        session.state = UploadState::Complete;

        let handle = api::file_handle(self.dispatcher.as_ref(), &file_handle_id).await?;
        info!(file_handle_id = %handle.id, "multipart upload complete");
        Ok(handle)
    }
}

fn record_outcome(
    session: &mut UploadSession,
    part_number: u32,
    outcome: Result<PartAck>,
    failures: &mut Vec<(u32, ConduitError)>,
) {
    let Some(part) = session.part_mut(part_number) else {
        return;
    };
    match outcome {
        Ok(ack) => {
            part.state = PartState::Uploaded;
            part.digest = Some(ack.md5_hex);
        }
        Err(err) => {
            warn!(part_number, error = %err, "part upload failed");
            part.state = PartState::Failed;
            failures.push((part_number, err));
        }
    }
}
