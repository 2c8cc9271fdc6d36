//! Chunked multipart upload engine

pub mod api;
pub mod digest;
pub mod orchestrator;
pub mod planner;
pub mod worker;

pub use orchestrator::MultipartUploader;
pub use planner::{choose_part_size, split_parts, total_parts};
pub use worker::{ChunkUploadWorker, PartAck, PartUpload};
