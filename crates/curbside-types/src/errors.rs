//! # Domain Type Errors
//!
//! Parse-level failures for the entity constructors in this crate.
//! Subsystem-specific errors (registry conflicts, persistence faults)
//! live in the crates that produce them.

use thiserror::Error;

/// Failure to construct a [`crate::PlateNumber`] from raw input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlateParseError {
    /// The input contained no plate characters after normalization.
    ///
    /// Covers the empty string, pure whitespace, and separator-only
    /// inputs such as `"--"`.
    #[error("plate number is empty after normalization")]
    Empty,
}
