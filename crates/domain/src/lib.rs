//! # Conduit Domain
//!
//! Domain types shared by the job and upload engine.
//!
//! This crate contains:
//! - The error taxonomy and `Result` alias
//! - Wire models for async jobs, multipart uploads and file handles
//! - Client configuration structures
//! - Platform limits and default timings
//!
//! ## Architecture
//! - No dependencies on other Conduit crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
