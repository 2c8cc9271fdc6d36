//! # Conduit Core
//!
//! Engine logic for asynchronous jobs and chunked multipart uploads.
//!
//! This crate contains:
//! - The job coordinator and the job kind table
//! - The upload planner, chunk worker and orchestrator
//! - Port interfaces (traits) for transport and byte sources
//!
//! ## Architecture Principles
//! - Only depends on `conduit-domain` and `conduit-common`
//! - No HTTP, filesystem or signing code
//! - All I/O goes through the traits in [`ports`]

pub mod jobs;
pub mod ports;
pub mod upload;

// Re-export specific items to avoid ambiguity
pub use jobs::{GenericJobRequest, JobCoordinator, JobKind, JobRequest};
pub use ports::{ApiRequest, ApiResponse, HttpMethod, PartTransfer, RestDispatcher, UploadSource};
pub use upload::{ChunkUploadWorker, MultipartUploader, PartAck, PartUpload};
