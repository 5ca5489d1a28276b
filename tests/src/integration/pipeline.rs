//! # End-to-End Submission Pipeline Tests
//!
//! Drives the full ingestion path the way a transport does:
//!
//! ```text
//! handle(method, body) → [IngressAdapter] → [ArrivalProcessor]
//!                                                 │
//!                              [PlateRegistry] ←──┤
//!                                     │           │
//!                               [PlateStore]      └──→ [Event Bus]
//!                                                          │
//!                                                          ▼
//!                                                  captured observers
//! ```
//!
//! ## Test Categories
//!
//! 1. **Submission outcomes**: recognized, miss, malformed, wrong verb,
//!    preflight
//! 2. **Invariants**: misses are side-effect-free, re-deliveries are
//!    absorbed, registry keys stay unique
//! 3. **Failure paths**: storage failures roll back and report sanitized

// =============================================================================
// TEST FIXTURES (only compiled during tests)
// =============================================================================

#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use chrono::{DateTime, TimeZone, Utc};

#[cfg(test)]
use curbside_arrivals::ArrivalProcessor;

#[cfg(test)]
use curbside_bus::{EventPublisher, InProcessEventBus, PickupEvent};

#[cfg(test)]
use curbside_gateway::{IngressAdapter, IngressReply, StatusCategory};

#[cfg(test)]
use curbside_registry::{ManualClock, MemoryStore, PlateRegistry};

#[cfg(test)]
use curbside_types::{ArrivalEvent, PlateNumber, PlateRecord};

/// When the pickup window opens in these scenarios.
#[cfg(test)]
fn pickup_window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 15, 30, 0).unwrap()
}

/// A record that has never had an arrival.
#[cfg(test)]
fn record(plate: &str, child: &str) -> PlateRecord {
    PlateRecord::new(PlateNumber::parse(plate).unwrap(), child.to_string(), None)
}

/// The full pipeline, wired the way the node wires it, with every
/// published event captured.
#[cfg(test)]
struct PipelineHarness {
    ingress: IngressAdapter,
    registry: Arc<PlateRegistry>,
    store: Arc<MemoryStore>,
    bus: Arc<InProcessEventBus>,
    clock: Arc<ManualClock>,
    seen: Arc<Mutex<Vec<PickupEvent>>>,
}

#[cfg(test)]
impl PipelineHarness {
    async fn with_records(records: Vec<PlateRecord>) -> Self {
        let store = Arc::new(MemoryStore::with_records(records));
        let registry = Arc::new(PlateRegistry::load(store.clone()).await.unwrap());
        let clock = Arc::new(ManualClock::starting_at(pickup_window_start()));
        let bus = Arc::new(InProcessEventBus::new());

        let seen: Arc<Mutex<Vec<PickupEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _token = bus.subscribe_fn(move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });

        let processor = Arc::new(ArrivalProcessor::new(
            registry.clone(),
            bus.clone(),
            clock.clone(),
        ));
        Self {
            ingress: IngressAdapter::new(processor),
            registry,
            store,
            bus,
            clock,
            seen,
        }
    }

    async fn seeded() -> Self {
        Self::with_records(vec![record("ABC123", "Emma Johnson")]).await
    }

    /// POST a `{"plateNumber": ...}` body through the shared entry point.
    async fn submit(&self, raw_plate: &str) -> IngressReply {
        let body = serde_json::to_vec(&serde_json::json!({ "plateNumber": raw_plate })).unwrap();
        self.ingress.handle("POST", &body).await
    }

    fn events(&self) -> Vec<PickupEvent> {
        self.seen.lock().unwrap().clone()
    }
}

// =============================================================================
// INTEGRATION TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: a registered plate submitted in lowercase is recognized and
    /// announced exactly once.
    #[tokio::test]
    async fn test_registered_plate_is_recognized() {
        let h = PipelineHarness::seeded().await;

        let reply = h.submit("abc123").await;

        assert_eq!(reply.status, StatusCategory::Ok);
        assert_eq!(reply.payload["success"], true);
        assert_eq!(reply.payload["message"], "Plate ABC123 recognized");
        assert_eq!(reply.payload["data"]["plateNumber"], "ABC123");
        assert_eq!(reply.payload["data"]["childName"], "Emma Johnson");
        assert_eq!(reply.payload["data"]["timestamp"], "2024-05-01T15:30:00Z");

        assert_eq!(
            h.events(),
            vec![PickupEvent::Arrival(ArrivalEvent {
                plate_number: PlateNumber::parse("ABC123").unwrap(),
                child_name: "Emma Johnson".to_string(),
                occurred_at: pickup_window_start(),
            })]
        );
    }

    /// Test: a body without the plate field never reaches the processor.
    #[tokio::test]
    async fn test_missing_plate_field_is_a_bad_request() {
        let h = PipelineHarness::seeded().await;
        let saves_before = h.store.save_count();

        let reply = h.ingress.handle("POST", b"{}").await;

        assert_eq!(reply.status, StatusCategory::BadRequest);
        assert_eq!(reply.payload["message"], "Missing plateNumber in request body");
        assert!(h.events().is_empty());
        assert_eq!(h.store.save_count(), saves_before);
    }

    /// Test: verbs outside the submission contract are refused outright.
    #[tokio::test]
    async fn test_wrong_verb_is_method_not_allowed() {
        let h = PipelineHarness::seeded().await;

        let reply = h.ingress.handle("GET", b"").await;

        assert_eq!(reply.status, StatusCategory::MethodNotAllowed);
        assert_eq!(reply.payload["message"], "Method not allowed. Use POST.");
        assert!(h.events().is_empty());
    }

    /// Test: a miss against an empty registry mutates nothing and
    /// invokes no subscriber.
    #[tokio::test]
    async fn test_unknown_plate_is_a_side_effect_free_miss() {
        let h = PipelineHarness::with_records(vec![]).await;
        let saves_before = h.store.save_count();

        let reply = h.submit("ZZZ999").await;

        assert_eq!(reply.status, StatusCategory::NotFound);
        assert_eq!(reply.payload["message"], "Plate ZZZ999 not found in system");
        assert!(h.events().is_empty());
        assert_eq!(h.bus.events_published(), 0);
        assert!(h.registry.is_empty().await);
        assert_eq!(h.store.save_count(), saves_before);
    }

    /// Test: preflight acknowledges with an empty payload and touches
    /// nothing downstream.
    #[tokio::test]
    async fn test_preflight_acknowledges_without_processing() {
        let h = PipelineHarness::seeded().await;
        let saves_before = h.store.save_count();

        let reply = h.ingress.handle("OPTIONS", b"").await;

        assert!(reply.is_preflight());
        assert_eq!(reply.status, StatusCategory::Ok);
        assert!(reply.payload.is_null());
        assert!(h.events().is_empty());
        assert_eq!(h.store.save_count(), saves_before);
    }

    /// Test: every formatting variant of one physical plate resolves to
    /// the same record.
    #[tokio::test]
    async fn test_reading_variants_resolve_to_the_same_record() {
        let h = PipelineHarness::seeded().await;

        for raw in ["abc123", " ABC 123 ", "a-b-c-1.2.3"] {
            h.clock.advance(chrono::Duration::minutes(1));
            let reply = h.submit(raw).await;
            assert_eq!(reply.status, StatusCategory::Ok, "raw reading: {raw:?}");
            assert_eq!(reply.payload["data"]["plateNumber"], "ABC123");
        }

        assert_eq!(h.registry.len().await, 1);
        assert_eq!(h.events().len(), 3);
    }

    /// Test: a re-delivery in the same instant matches but announces
    /// nothing new.
    #[tokio::test]
    async fn test_same_instant_redelivery_is_absorbed() {
        let h = PipelineHarness::seeded().await;

        let first = h.submit("ABC123").await;
        let second = h.submit("ABC123").await;

        assert_eq!(first.status, StatusCategory::Ok);
        assert_eq!(second.status, StatusCategory::Ok);
        assert_eq!(
            second.payload["data"]["timestamp"],
            first.payload["data"]["timestamp"]
        );
        assert_eq!(h.events().len(), 1);
    }

    /// Test: a reading carried by a regressed clock reports the stored
    /// state instead of rewinding it.
    #[tokio::test]
    async fn test_stale_redelivery_reports_current_state() {
        let h = PipelineHarness::seeded().await;

        h.submit("ABC123").await;
        h.clock.advance(chrono::Duration::minutes(-5));
        let reply = h.submit("ABC123").await;

        assert_eq!(reply.status, StatusCategory::Ok);
        assert_eq!(reply.payload["data"]["timestamp"], "2024-05-01T15:30:00Z");
        assert_eq!(h.events().len(), 1);

        let stored = h
            .registry
            .find(&PlateNumber::parse("ABC123").unwrap())
            .await
            .unwrap();
        assert_eq!(stored.last_arrival, Some(pickup_window_start()));
    }

    /// Test: registering an existing key fails and leaves the registry
    /// and the store untouched.
    #[tokio::test]
    async fn test_duplicate_registration_preserves_the_registry() {
        let h = PipelineHarness::seeded().await;
        let stored_before = h.store.stored();

        let result = h
            .registry
            .add(
                PlateNumber::parse("abc-123").unwrap(),
                "Someone Else",
                None,
            )
            .await;

        assert!(matches!(
            result,
            Err(curbside_registry::RegistryError::DuplicateKey { .. })
        ));
        assert_eq!(h.registry.len().await, 1);
        assert_eq!(h.store.stored(), stored_before);
    }

    /// Test: a storage failure surfaces sanitized, rolls the record
    /// back, and the next reading goes through.
    #[tokio::test]
    async fn test_storage_failure_rolls_back_and_recovers() {
        let h = PipelineHarness::seeded().await;

        h.store.fail_next_save();
        let reply = h.submit("ABC123").await;

        assert_eq!(reply.status, StatusCategory::InternalError);
        assert_eq!(
            reply.payload,
            serde_json::json!({
                "success": false,
                "message": "Internal server error",
                "error": "storage failure",
            })
        );
        assert!(h.events().is_empty());

        let record = h
            .registry
            .find(&PlateNumber::parse("ABC123").unwrap())
            .await
            .unwrap();
        assert_eq!(record.last_arrival, None);

        let retry = h.submit("ABC123").await;
        assert_eq!(retry.status, StatusCategory::Ok);
        assert_eq!(h.events().len(), 1);
    }

    /// Test: sequential submissions for different plates are announced
    /// in submission order.
    #[tokio::test]
    async fn test_arrivals_are_announced_in_submission_order() {
        let h = PipelineHarness::with_records(vec![
            record("ABC123", "Emma Johnson"),
            record("XYZ789", "Noah Williams"),
            record("DEF456", "Olivia Davis"),
        ])
        .await;

        for plate in ["XYZ789", "DEF456", "ABC123"] {
            h.clock.advance(chrono::Duration::seconds(30));
            h.submit(plate).await;
        }

        let announced: Vec<String> = h
            .events()
            .iter()
            .map(|event| match event {
                PickupEvent::Arrival(arrival) => arrival.plate_number.to_string(),
                other => panic!("unexpected event: {other:?}"),
            })
            .collect();
        assert_eq!(announced, vec!["XYZ789", "DEF456", "ABC123"]);
    }
}
