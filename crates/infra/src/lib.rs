//! # Conduit Infrastructure
//!
//! Implementations of the `conduit-core` ports plus the client facade.
//!
//! This crate contains:
//! - The retrying reqwest `HttpClient`
//! - Request signing and the `SignedDispatcher`
//! - `PresignedTransfer` for raw part PUTs
//! - `FileSource` for streaming parts from disk
//! - Configuration loading
//! - `ConduitClient`, which wires everything together
//!
//! ## Architecture
//! - Implements traits defined in `conduit-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod source;

// Re-export commonly used items
pub use api::{PresignedTransfer, SignedDispatcher};
pub use client::{ConduitClient, UploadOptions};
pub use errors::InfraError;
pub use http::HttpClient;
pub use source::FileSource;
