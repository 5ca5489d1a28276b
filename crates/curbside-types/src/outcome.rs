//! # Ingestion Outcomes
//!
//! The structured result of pushing one plate reading through the
//! pipeline. Transports translate these into wire replies; nothing in
//! this module renders user-facing text.

use crate::entities::{PlateNumber, PlateRecord};
use thiserror::Error;

/// Outcome of processing a single submitted plate reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionResult {
    /// The plate resolved to a record; `record` reflects the state after
    /// the arrival was recorded.
    Matched {
        /// The matched record, including its updated `last_arrival`.
        record: PlateRecord,
    },
    /// The normalized plate has no record. A miss is side-effect free.
    NotFound {
        /// The normalized plate that failed to resolve.
        plate_number: PlateNumber,
    },
    /// The reading never reached a lookup, or the arrival could not be
    /// durably recorded.
    Rejected {
        /// Why the reading was rejected.
        reason: RejectReason,
    },
}

/// Why a reading was rejected before or during recording.
///
/// The two variants map to different transport statuses (validation
/// versus server fault), so they are kept structurally distinct rather
/// than collapsed into a message string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing remained after normalization; no lookup was attempted.
    #[error("plate number is empty after normalization")]
    EmptyPlate,

    /// The store refused the arrival write. In-memory state was left
    /// untouched; the caller owns any retry.
    #[error("storage failure: {0}")]
    Persistence(String),
}
