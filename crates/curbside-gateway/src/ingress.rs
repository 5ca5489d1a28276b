//! # Transport-Agnostic Ingress
//!
//! [`IngressAdapter`] accepts raw submissions from any transport (HTTP,
//! in-process channel, camera simulator) and returns an [`IngressReply`]
//! that the transport renders onto its own wire. The adapter owns the
//! method gate and body decoding; plate semantics stay with the arrival
//! processor.
//!
//! ## Reply Mapping
//!
//! | Submission                          | Status category    |
//! |-------------------------------------|--------------------|
//! | OPTIONS (any body)                  | Ok, empty payload  |
//! | Verb other than POST / OPTIONS      | MethodNotAllowed   |
//! | Unparseable body or missing field   | BadRequest         |
//! | Plate empty after normalization     | BadRequest         |
//! | Plate not registered                | NotFound           |
//! | Plate matched                       | Ok                 |
//! | Arrival could not be persisted      | InternalError      |

use std::sync::Arc;

use curbside_arrivals::ArrivalProcessor;
use curbside_registry::RegistryError;
use curbside_types::{IngestionResult, RejectReason};
use serde_json::Value;
use tracing::debug;

use crate::wire::{
    self, PlateSubmission, METHOD_NOT_ALLOWED_MESSAGE, MISSING_PLATE_MESSAGE,
};

// =====================================================================
// REPLY TYPES
// =====================================================================

/// Transport-neutral status of a handled submission.
///
/// Each transport maps these onto its own status space; the HTTP adapter
/// uses the obvious 2xx/4xx/5xx codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// The submission was accepted (match, preflight, or admin read).
    Ok,
    /// The submission was malformed or failed validation.
    BadRequest,
    /// The verb is not part of the submission contract.
    MethodNotAllowed,
    /// The plate has no record.
    NotFound,
    /// The request conflicts with existing registry state.
    Conflict,
    /// The arrival could not be durably recorded.
    InternalError,
}

impl StatusCategory {
    /// Whether this category reports a handled, successful submission.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// The outcome a transport renders back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressReply {
    /// Transport-neutral status.
    pub status: StatusCategory,
    /// JSON envelope to serialize onto the wire. `Null` for preflight.
    pub payload: Value,
}

impl IngressReply {
    pub(crate) fn new(status: StatusCategory, payload: Value) -> Self {
        Self { status, payload }
    }

    /// Reply to a preflight probe. Carries no payload; the HTTP transport
    /// renders it as an empty 204 with CORS headers.
    pub(crate) fn preflight() -> Self {
        Self::new(StatusCategory::Ok, Value::Null)
    }

    /// Whether this reply is a bodiless preflight acknowledgement.
    #[must_use]
    pub fn is_preflight(&self) -> bool {
        self.status.is_success() && self.payload.is_null()
    }
}

// =====================================================================
// INGRESS ADAPTER
// =====================================================================

/// Accepts submissions from every transport and shapes the replies.
pub struct IngressAdapter {
    processor: Arc<ArrivalProcessor>,
}

impl IngressAdapter {
    #[must_use]
    pub fn new(processor: Arc<ArrivalProcessor>) -> Self {
        Self { processor }
    }

    /// Handle one raw submission.
    ///
    /// `method` is matched case-insensitively. The body is only decoded
    /// for POST; preflight and rejected verbs never look at it.
    pub async fn handle(&self, method: &str, body: &[u8]) -> IngressReply {
        if method.eq_ignore_ascii_case("OPTIONS") {
            return IngressReply::preflight();
        }
        if !method.eq_ignore_ascii_case("POST") {
            debug!(method, "[ingress] Rejected verb");
            return IngressReply::new(
                StatusCategory::MethodNotAllowed,
                wire::failure(METHOD_NOT_ALLOWED_MESSAGE),
            );
        }

        // Presence is checked here; emptiness is the processor's verdict,
        // so a whitespace reading takes the same path as a junk one.
        let Some(raw) = extract_plate(body) else {
            debug!("[ingress] Submission body had no plateNumber field");
            return IngressReply::new(
                StatusCategory::BadRequest,
                wire::failure(MISSING_PLATE_MESSAGE),
            );
        };

        match self.processor.process(&raw).await {
            IngestionResult::Matched { record } => {
                IngressReply::new(StatusCategory::Ok, wire::recognized(&record))
            }
            IngestionResult::NotFound { plate_number } => IngressReply::new(
                StatusCategory::NotFound,
                wire::plate_not_found(&plate_number),
            ),
            IngestionResult::Rejected {
                reason: RejectReason::EmptyPlate,
            } => IngressReply::new(
                StatusCategory::BadRequest,
                wire::failure(MISSING_PLATE_MESSAGE),
            ),
            IngestionResult::Rejected {
                reason: RejectReason::Persistence(_),
            } => IngressReply::new(StatusCategory::InternalError, wire::storage_failure()),
        }
    }
}

/// Decode the submission body and pull out the plate field, if any.
fn extract_plate(body: &[u8]) -> Option<String> {
    let submission: PlateSubmission = serde_json::from_slice(body).ok()?;
    submission.plate_number
}

// =====================================================================
// ADMIN REPLY SHAPING
// =====================================================================

/// Map a registry error onto the reply envelope used by the
/// administrative routes.
pub(crate) fn registry_error_reply(err: &RegistryError) -> IngressReply {
    match err {
        RegistryError::DuplicateKey { plate } => IngressReply::new(
            StatusCategory::Conflict,
            wire::failure(format!("Plate {plate} is already registered")),
        ),
        RegistryError::NotFound { plate } => {
            IngressReply::new(StatusCategory::NotFound, wire::plate_not_found(plate))
        }
        RegistryError::EmptyChildName => IngressReply::new(
            StatusCategory::BadRequest,
            wire::failure("Child name must not be empty"),
        ),
        RegistryError::StaleTimestamp { .. } => IngressReply::new(
            StatusCategory::Conflict,
            wire::failure("Arrival timestamp is older than the recorded arrival"),
        ),
        RegistryError::Persistence(_) => {
            IngressReply::new(StatusCategory::InternalError, wire::storage_failure())
        }
    }
}
