//! # Arrival Processing
//!
//! The pipeline between a raw reading and a published arrival event.

use curbside_bus::{EventPublisher, PickupEvent};
use curbside_registry::{Clock, PlateRegistry, RecordedArrival, RegistryError};
use curbside_types::{ArrivalEvent, IngestionResult, PlateNumber, PlateParseError, RejectReason};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Processes submitted plate readings.
///
/// Stateless itself; all record state lives in the registry and all
/// fan-out goes through the bus, so any number of transports can share
/// one processor.
pub struct ArrivalProcessor {
    registry: Arc<PlateRegistry>,
    bus: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ArrivalProcessor {
    /// Wire a processor to its collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<PlateRegistry>,
        bus: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            bus,
            clock,
        }
    }

    /// Process one raw plate reading.
    ///
    /// - An empty reading is rejected before any lookup.
    /// - An unknown plate is a side-effect-free miss.
    /// - A known plate has its arrival recorded and, when the record
    ///   actually advanced, exactly one [`PickupEvent::Arrival`] is
    ///   published before this returns. Re-deliveries that do not advance
    ///   the record (equal or older timestamp) are absorbed as matches
    ///   without a second event.
    /// - A failed persistence leaves the record untouched and surfaces as
    ///   a rejection; the caller owns any retry.
    pub async fn process(&self, raw: &str) -> IngestionResult {
        let plate = match PlateNumber::parse(raw) {
            Ok(plate) => plate,
            Err(PlateParseError::Empty) => {
                debug!("[arrivals] Rejected reading with no plate characters");
                return IngestionResult::Rejected {
                    reason: RejectReason::EmptyPlate,
                };
            }
        };

        let now = self.clock.now();
        match self.registry.record_arrival(&plate, now).await {
            Ok(RecordedArrival {
                record,
                advanced: true,
            }) => {
                info!(
                    plate = %record.plate_number,
                    child = %record.child_name,
                    "[arrivals] Plate recognized"
                );
                let event = ArrivalEvent {
                    plate_number: record.plate_number.clone(),
                    child_name: record.child_name.clone(),
                    occurred_at: now,
                };
                self.bus.publish(&PickupEvent::Arrival(event));
                IngestionResult::Matched { record }
            }
            Ok(RecordedArrival {
                record,
                advanced: false,
            }) => {
                debug!(plate = %record.plate_number, "[arrivals] Re-delivery absorbed");
                IngestionResult::Matched { record }
            }
            Err(RegistryError::NotFound { plate }) => {
                debug!(plate = %plate, "[arrivals] Unknown plate");
                IngestionResult::NotFound {
                    plate_number: plate,
                }
            }
            Err(RegistryError::StaleTimestamp { stored, attempted }) => {
                // A reading older than the record is a re-delivery; answer
                // with the current state and publish nothing.
                warn!(
                    plate = %plate,
                    stored = %stored,
                    attempted = %attempted,
                    "[arrivals] Stale reading absorbed"
                );
                match self.registry.find(&plate).await {
                    Some(record) => IngestionResult::Matched { record },
                    None => IngestionResult::NotFound {
                        plate_number: plate,
                    },
                }
            }
            Err(RegistryError::Persistence(e)) => {
                error!(plate = %plate, error = %e, "[arrivals] Arrival could not be persisted");
                IngestionResult::Rejected {
                    reason: RejectReason::Persistence(e.to_string()),
                }
            }
            Err(e) => {
                error!(plate = %plate, error = %e, "[arrivals] Unexpected registry error");
                IngestionResult::Rejected {
                    reason: RejectReason::Persistence(e.to_string()),
                }
            }
        }
    }
}
