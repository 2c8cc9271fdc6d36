//! Platform REST access
//!
//! - [`SignedDispatcher`]: signed, retrying calls to the repo/file/auth roots
//! - [`PresignedTransfer`]: bare byte PUTs to presigned storage URLs

pub mod dispatcher;
pub mod signing;
pub mod transfer;

pub use dispatcher::SignedDispatcher;
pub use transfer::PresignedTransfer;
