//! # Transport Parity Tests
//!
//! Every transport is a thin translator over the same ingress adapter,
//! so for one submission they must agree on everything except the frame
//! they wrap it in. These tests submit identical readings through the
//! HTTP router, the in-process channel, and the camera simulator and
//! compare the results byte for byte.
//!
//! ## Test Categories
//!
//! 1. **Reply parity**: channel payloads are byte-identical to HTTP
//!    bodies for the same submission
//! 2. **Notification contract**: recognized plates reach broadcast
//!    subscribers as `PLATE_DETECTED` messages
//! 3. **Administrative surface**: conflicts leave the registry intact

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    use curbside_arrivals::ArrivalProcessor;
    use curbside_bus::{EventPublisher, InProcessEventBus};
    use curbside_gateway::{
        CameraSimulator, ChannelTransport, ClientMessage, HttpConfig, HttpTransport,
        IngressAdapter, NotificationChannel, StatusCategory,
    };
    use curbside_registry::{ManualClock, MemoryStore, PlateRegistry};
    use curbside_types::{PlateNumber, PlateRecord};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct TransportHarness {
        router: Router,
        channel: ChannelTransport,
        simulator: CameraSimulator,
        notifications: NotificationChannel,
        bus: Arc<InProcessEventBus>,
        registry: Arc<PlateRegistry>,
    }

    async fn harness() -> TransportHarness {
        let records = vec![
            PlateRecord::new(
                PlateNumber::parse("ABC123").unwrap(),
                "Emma Johnson".to_string(),
                None,
            ),
            PlateRecord::new(
                PlateNumber::parse("XYZ789").unwrap(),
                "Noah Williams".to_string(),
                None,
            ),
        ];
        let store = Arc::new(MemoryStore::with_records(records));
        let registry = Arc::new(PlateRegistry::load(store.clone()).await.unwrap());
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 5, 1, 15, 30, 0).unwrap(),
        ));
        let bus = Arc::new(InProcessEventBus::new());
        let notifications = NotificationChannel::attach(&bus, 8);

        let processor = Arc::new(ArrivalProcessor::new(registry.clone(), bus.clone(), clock));
        let ingress = Arc::new(IngressAdapter::new(processor));

        let router =
            HttpTransport::new(HttpConfig::default(), ingress.clone(), registry.clone()).router();
        let channel = ChannelTransport::start(ingress.clone(), 8);
        let simulator = CameraSimulator::new(ingress);

        TransportHarness {
            router,
            channel,
            simulator,
            notifications,
            bus,
            registry,
        }
    }

    async fn send(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    // =========================================================================
    // REPLY PARITY
    // =========================================================================

    /// Test: for every submission outcome, the channel's payload is the
    /// exact byte sequence the HTTP transport puts on the wire.
    #[tokio::test]
    async fn test_channel_payloads_match_http_bodies_byte_for_byte() {
        let h = harness().await;

        // The clock is frozen, so resubmitting a recognized plate through
        // the second transport is absorbed with an identical timestamp.
        let cases = [
            ("POST", r#"{"plateNumber": "abc-123"}"#, StatusCode::OK),
            ("POST", "{}", StatusCode::BAD_REQUEST),
            ("POST", r#"{"plateNumber": "GHOST1"}"#, StatusCode::NOT_FOUND),
            ("GET", "", StatusCode::METHOD_NOT_ALLOWED),
        ];

        for (method, body, expected_status) in cases {
            let (http_status, http_body) =
                send(h.router.clone(), method, "/api/plate", body).await;
            let reply = h
                .channel
                .submit(method, body.as_bytes().to_vec())
                .await
                .unwrap();

            assert_eq!(http_status, expected_status, "case: {method} {body}");
            assert_eq!(
                http_body,
                serde_json::to_vec(&reply.payload).unwrap(),
                "case: {method} {body}"
            );
        }
    }

    /// Test: preflight is the one bodiless reply. HTTP renders 204 with
    /// no content; the channel marks the reply as a preflight.
    #[tokio::test]
    async fn test_preflight_parity() {
        let h = harness().await;

        let (status, body) = send(h.router.clone(), "OPTIONS", "/api/plate", "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        let reply = h.channel.submit("OPTIONS", Vec::new()).await.unwrap();
        assert!(reply.is_preflight());
        assert_eq!(h.bus.events_published(), 0);
    }

    /// Test: the simulator produces the same reply as a channel
    /// submission of the same raw reading.
    #[tokio::test]
    async fn test_simulator_submits_like_any_other_transport() {
        let h = harness().await;

        let simulated = h.simulator.submit("xyz 789").await;
        let channeled = h
            .channel
            .submit("POST", br#"{"plateNumber": "xyz 789"}"#.to_vec())
            .await
            .unwrap();

        assert_eq!(simulated.status, StatusCategory::Ok);
        assert_eq!(simulated.payload["data"]["plateNumber"], "XYZ789");
        assert_eq!(simulated, channeled);
    }

    // =========================================================================
    // NOTIFICATION CONTRACT
    // =========================================================================

    /// Test: a recognized plate reaches broadcast subscribers as a
    /// `PLATE_DETECTED` message with the documented wire shape.
    #[tokio::test]
    async fn test_recognized_plate_notifies_subscribers() {
        let h = harness().await;
        let mut receiver = h.notifications.subscribe();

        let (status, _) = send(
            h.router.clone(),
            "POST",
            "/api/plate",
            r#"{"plateNumber": "ABC123"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let message = receiver.try_recv().unwrap();
        assert_eq!(
            message,
            ClientMessage::PlateDetected {
                plate_number: "ABC123".to_string(),
            }
        );
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"type": "PLATE_DETECTED", "plateNumber": "ABC123"})
        );
    }

    /// Test: a miss notifies nobody.
    #[tokio::test]
    async fn test_miss_stays_silent_for_subscribers() {
        let h = harness().await;
        let mut receiver = h.notifications.subscribe();

        let (status, _) = send(
            h.router.clone(),
            "POST",
            "/api/plate",
            r#"{"plateNumber": "GHOST1"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert!(receiver.try_recv().is_err());
        assert_eq!(h.bus.events_published(), 0);
    }

    // =========================================================================
    // ADMINISTRATIVE SURFACE
    // =========================================================================

    /// Test: registering an already-known plate is a conflict and leaves
    /// the registry size unchanged.
    #[tokio::test]
    async fn test_admin_duplicate_registration_conflicts() {
        let h = harness().await;
        let plates_before = h.registry.len().await;

        let (status, body) = send(
            h.router.clone(),
            "POST",
            "/api/plates",
            r#"{"plateNumber": "abc 123", "childName": "Someone Else"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["success"], false);
        assert_eq!(payload["message"], "Plate ABC123 is already registered");
        assert_eq!(h.registry.len().await, plates_before);
    }

    /// Test: the administrative list reflects arrivals made through the
    /// submission path, most recent first.
    #[tokio::test]
    async fn test_admin_list_reflects_submissions() {
        let h = harness().await;

        let (status, _) = send(
            h.router.clone(),
            "POST",
            "/api/plate",
            r#"{"plateNumber": "XYZ789"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(h.router.clone(), "GET", "/api/plates", "").await;
        assert_eq!(status, StatusCode::OK);

        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let plates: Vec<&str> = payload["data"]["plates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|record| record["plateNumber"].as_str().unwrap())
            .collect();
        assert_eq!(plates, vec!["XYZ789", "ABC123"]);
        assert!(payload["data"]["plates"][0]["lastArrival"].is_string());
    }
}
