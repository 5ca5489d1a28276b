//! # Core Domain Entities
//!
//! Defines the entities that flow between the curbside subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: [`PlateNumber`], the normalized registry key
//! - **Registry**: [`PlateRecord`], the plate-to-child association
//! - **Events**: [`ArrivalEvent`], the payload published on a match

use crate::errors::PlateParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A normalized license plate number.
///
/// The only constructor is [`PlateNumber::parse`], which trims the input,
/// uppercases it, and strips separator noise (internal whitespace, `-`, `.`).
/// Every instance therefore holds the canonical form, and `"abc-123"`,
/// `" ABC 123 "`, and `"ABC123"` all compare equal.
///
/// Normalization is idempotent: parsing an already-normalized plate returns
/// the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlateNumber(String);

impl PlateNumber {
    /// Parse and normalize a raw plate reading.
    ///
    /// # Errors
    ///
    /// Returns [`PlateParseError::Empty`] when nothing remains after
    /// normalization.
    pub fn parse(raw: &str) -> Result<Self, PlateParseError> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
            .flat_map(char::to_uppercase)
            .collect();

        if normalized.is_empty() {
            return Err(PlateParseError::Empty);
        }
        Ok(Self(normalized))
    }

    /// The canonical plate string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the plate and return the canonical string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlateNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for PlateNumber {
    type Err = PlateParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Serialize for PlateNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// Deserialization goes through `parse` so a hand-edited data file cannot
// introduce a non-canonical key.
impl<'de> Deserialize<'de> for PlateNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// CLUSTER B: REGISTRY
// =============================================================================

/// A plate-to-child association held by the registry.
///
/// Exactly one record exists per normalized plate. `last_arrival` starts
/// absent, only moves forward once set, and is never cleared by ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateRecord {
    /// The normalized plate, unique across the registry.
    pub plate_number: PlateNumber,
    /// Display name of the child associated with the plate. Never empty.
    pub child_name: String,
    /// Free-form staff notes (allergies, pickup instructions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Timestamp of the most recent recorded arrival, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_arrival: Option<DateTime<Utc>>,
}

impl PlateRecord {
    /// Create a record that has never had an arrival.
    #[must_use]
    pub fn new(plate_number: PlateNumber, child_name: String, notes: Option<String>) -> Self {
        Self {
            plate_number,
            child_name,
            notes,
            last_arrival: None,
        }
    }
}

// =============================================================================
// CLUSTER C: EVENTS
// =============================================================================

/// Payload published on the bus when a recognized plate arrives.
///
/// Emitted exactly once per ingestion that advances a record's
/// `last_arrival`; a miss or an absorbed re-delivery emits nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalEvent {
    /// The matched plate.
    pub plate_number: PlateNumber,
    /// The child associated with the plate at match time.
    pub child_name: String,
    /// When the arrival was recorded.
    pub occurred_at: DateTime<Utc>,
}
