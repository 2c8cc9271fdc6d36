//! Macro for implementing Display and FromStr for wire state enums
//!
//! The platform spells states in upper snake case (`PROCESSING`,
//! `ADD_SUCCESS`). Display emits that spelling; FromStr accepts any case.
//!
//! # Example
//!
//! ```rust
//! use conduit_domain::impl_state_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Running,
//!     Done,
//! }
//!
//! impl_state_conversions!(Phase {
//!     Running => "RUNNING",
//!     Done => "DONE",
//! });
//!
//! assert_eq!(Phase::Done.to_string(), "DONE");
//! assert_eq!("running".parse::<Phase>().unwrap(), Phase::Running);
//! ```

/// Implements Display and FromStr traits for state enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire spelling
#[macro_export]
macro_rules! impl_state_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
