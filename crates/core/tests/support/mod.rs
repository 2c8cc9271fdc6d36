//! Shared test helpers for `conduit-core` integration tests.
//!
//! In-memory stand-ins for the platform's file and job services, so the
//! engine can be driven end to end without a network.

#![allow(dead_code)]

pub mod file_store;
pub mod job_server;
pub mod sources;
pub mod transfers;

pub use file_store::FakeFileStore;
pub use job_server::ScriptedJobServer;
pub use sources::MemorySource;
pub use transfers::{InFlightTransfer, PanickingTransfer};

use conduit_domain::UploadConfig;

/// Small parts and no retry sleeps, so tests stay fast.
pub fn test_upload_config(part_size: u64) -> UploadConfig {
    UploadConfig {
        concurrency: 3,
        part_retry_delays_ms: vec![0, 0, 0],
        min_part_size: part_size,
        ..UploadConfig::default()
    }
}

/// Deterministic, non-repeating test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
