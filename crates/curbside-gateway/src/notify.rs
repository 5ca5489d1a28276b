//! # Client Notifications
//!
//! Bridges pickup events onto a broadcast channel of client-facing
//! messages. Display surfaces (dashboard processes, push bridges)
//! subscribe here instead of the event bus, so the wire vocabulary can
//! stay stable while internal events evolve.
//!
//! Only recognized arrivals are forwarded. Everything else on the bus is
//! operator-facing and stays out of the client vocabulary.

use curbside_bus::{InProcessEventBus, PickupEvent, SubscriptionToken};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

/// A message pushed to connected display clients.
///
/// Serializes with a `type` discriminator, which is the shape clients
/// switch on:
///
/// ```text
/// {"type": "PLATE_DETECTED", "plateNumber": "ABC123"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// A registered plate was recognized at the curb.
    #[serde(rename = "PLATE_DETECTED", rename_all = "camelCase")]
    PlateDetected {
        /// The normalized plate that matched.
        plate_number: String,
    },
}

/// Fan-out point for client notifications.
///
/// Attaching subscribes to the bus; messages are dropped when no client
/// is listening, which is the normal state on a headless node.
pub struct NotificationChannel {
    sender: broadcast::Sender<ClientMessage>,
    token: SubscriptionToken,
}

impl NotificationChannel {
    /// Subscribe to `bus` and start forwarding arrivals.
    ///
    /// `capacity` bounds the per-receiver backlog; slow clients skip
    /// messages rather than stall the pipeline.
    #[must_use]
    pub fn attach(bus: &InProcessEventBus, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        let tx = sender.clone();
        let token = bus.subscribe_fn(move |event| {
            if let PickupEvent::Arrival(arrival) = event {
                let message = ClientMessage::PlateDetected {
                    plate_number: arrival.plate_number.to_string(),
                };
                if tx.send(message).is_err() {
                    debug!("[gateway] Notification dropped (no clients attached)");
                }
            }
            Ok(())
        });

        Self { sender, token }
    }

    /// A fresh receiver; sees only messages sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientMessage> {
        self.sender.subscribe()
    }

    /// The notification feed as a stream, for select loops.
    #[must_use]
    pub fn stream(&self) -> BroadcastStream<ClientMessage> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Number of currently attached client receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stop forwarding and drop the bus subscription.
    pub fn detach(&self, bus: &InProcessEventBus) -> bool {
        bus.unsubscribe(self.token)
    }
}
