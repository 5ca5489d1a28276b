//! Wire contract for plate submissions.
//!
//! Every reply that leaves the gateway is a JSON envelope:
//!
//! ```text
//! { "success": bool, "message": "...", "data": { ... } }   // message and data optional
//! ```
//!
//! The builders here are the only place those envelopes are assembled, so the
//! exact field names and message strings that clients pattern-match on live in
//! one file. Transports must not invent their own shapes.

use curbside_types::{PlateNumber, PlateRecord};
use serde::Deserialize;
use serde_json::{json, Value};

/// Reply message when the submission body lacks a usable `plateNumber` field.
pub(crate) const MISSING_PLATE_MESSAGE: &str = "Missing plateNumber in request body";

/// Reply message for any verb other than POST or OPTIONS.
pub(crate) const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed. Use POST.";

/// Reply message for persistence failures. The underlying error text never
/// crosses the wire.
pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Sanitized detail string attached to persistence failure replies.
pub(crate) const STORAGE_FAILURE_DETAIL: &str = "storage failure";

// =====================================================================
// REQUEST BODIES
// =====================================================================

/// Body of a plate submission. The field is optional so that presence can be
/// checked explicitly and reported with a stable message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlateSubmission {
    #[serde(default)]
    pub plate_number: Option<String>,
}

/// Body of an administrative plate registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterPlateRequest {
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub child_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of an administrative plate update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePlateRequest {
    #[serde(default)]
    pub child_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =====================================================================
// REPLY ENVELOPES
// =====================================================================

/// Successful reply with a human-readable message and a data payload.
pub(crate) fn success(message: impl Into<String>, data: Value) -> Value {
    json!({
        "success": true,
        "message": message.into(),
        "data": data,
    })
}

/// Successful reply carrying only data, for listing endpoints.
pub(crate) fn success_data(data: Value) -> Value {
    json!({
        "success": true,
        "data": data,
    })
}

/// Failed reply with a human-readable message.
pub(crate) fn failure(message: impl Into<String>) -> Value {
    json!({
        "success": false,
        "message": message.into(),
    })
}

/// Failed reply for persistence errors. Detail is fixed to a sanitized string
/// so that filesystem paths and I/O errors stay out of client responses.
pub(crate) fn storage_failure() -> Value {
    json!({
        "success": false,
        "message": INTERNAL_ERROR_MESSAGE,
        "error": STORAGE_FAILURE_DETAIL,
    })
}

/// Reply for a recognized plate. `timestamp` is the arrival instant that was
/// just recorded, so the record is expected to carry one.
pub(crate) fn recognized(record: &PlateRecord) -> Value {
    success(
        format!("Plate {} recognized", record.plate_number),
        json!({
            "plateNumber": record.plate_number,
            "childName": record.child_name,
            "timestamp": record.last_arrival,
        }),
    )
}

/// Reply for a plate that is not in the registry.
pub(crate) fn plate_not_found(plate: &PlateNumber) -> Value {
    failure(format!("Plate {plate} not found in system"))
}
