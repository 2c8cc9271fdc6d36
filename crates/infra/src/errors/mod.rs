//! Infrastructure error conversions

mod conversions;

pub(crate) use conversions::{reason_text, status_error};
pub use conversions::InfraError;
