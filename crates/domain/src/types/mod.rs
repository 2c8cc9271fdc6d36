//! Domain types and wire models

pub mod file;
pub mod job;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use file::FileHandle;
pub use job::{AsyncJobId, JobState, JobStatus, JobToken};
pub use upload::{
    AddPartResponse, AddPartState, BatchPresignedUploadUrlRequest,
    BatchPresignedUploadUrlResponse, MultipartState, MultipartUploadRequest,
    MultipartUploadStatus, Part, PartPresignedUrl, PartState, UploadMetadata, UploadSession,
    UploadState,
};

/// The platform exposes three REST roots; every call targets exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Repo,
    File,
    Auth,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Repo => "repo",
            Self::File => "file",
            Self::Auth => "auth",
        })
    }
}
