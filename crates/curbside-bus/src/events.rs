//! # Pickup Events
//!
//! Defines the event types that flow through the curbside bus.

use chrono::{DateTime, Utc};
use curbside_types::ArrivalEvent;
use serde::{Deserialize, Serialize};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupEvent {
    /// A recognized plate arrived and its record's `lastArrival` advanced.
    ///
    /// Published at most once per ingestion; absorbed re-deliveries and
    /// misses publish nothing.
    Arrival(ArrivalEvent),

    /// The upstream connectivity probe observed a transition.
    ///
    /// Published on status changes only (plus the first probe), so a
    /// steady upstream keeps the bus quiet.
    UpstreamStatus {
        /// Whether the upstream accepted the probe.
        online: bool,
        /// When the probe ran.
        probed_at: DateTime<Utc>,
    },
}

impl PickupEvent {
    /// Short event kind label for log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Arrival(_) => "arrival",
            Self::UpstreamStatus { .. } => "upstream_status",
        }
    }
}
