//! # Domain Errors
//!
//! Error types for the plate registry subsystem.
//!
//! ## Design Principles
//!
//! - Each error maps to a specific registry rule
//! - Errors carry the data a caller needs to act, not rendered prose
//! - No panics in domain logic (use Result instead)

use chrono::{DateTime, Utc};
use curbside_types::PlateNumber;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A record already exists for this normalized plate.
    #[error("plate {plate} is already registered")]
    DuplicateKey {
        /// The conflicting plate.
        plate: PlateNumber,
    },

    /// No record exists for this normalized plate.
    #[error("plate {plate} not found")]
    NotFound {
        /// The plate that failed to resolve.
        plate: PlateNumber,
    },

    /// The supplied child name was empty or whitespace.
    #[error("child name must not be empty")]
    EmptyChildName,

    /// The arrival timestamp is older than the recorded one.
    ///
    /// The record was not modified and nothing was persisted.
    #[error("arrival at {attempted} is older than the recorded arrival at {stored}")]
    StaleTimestamp {
        /// The arrival already on the record.
        stored: DateTime<Utc>,
        /// The older timestamp that was refused.
        attempted: DateTime<Utc>,
    },

    /// The backing store rejected the write; in-memory state is unchanged.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors from the persistence boundary.
///
/// Store adapters fold their underlying failures into these two shapes;
/// the registry treats both as "the write did not happen".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// I/O failure reading or writing the backing store.
    #[error("store I/O error: {message}")]
    Io {
        /// Underlying failure description.
        message: String,
    },

    /// The stored data could not be encoded or decoded.
    #[error("store serialization error: {message}")]
    Serialization {
        /// Underlying failure description.
        message: String,
    },
}

impl PersistenceError {
    /// Wrap an I/O failure.
    #[must_use]
    pub fn io(err: &std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }

    /// Wrap an encode/decode failure.
    #[must_use]
    pub fn serialization(err: &serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
