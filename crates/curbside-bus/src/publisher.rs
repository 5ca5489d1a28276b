//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::PickupEvent;
use crate::subscriber::{EventHandler, FnHandler, HandlerError, SubscriptionToken};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
///
/// This is the interface the arrival pipeline emits through; it never
/// knows who is listening.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// Every handler subscribed at the moment of the call has run by the
    /// time this returns.
    ///
    /// # Returns
    ///
    /// The number of handlers the event was delivered to.
    fn publish(&self, event: &PickupEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-process implementation of the event bus.
///
/// Handlers are invoked synchronously, in subscription order, within the
/// publishing call. The handler list is snapshotted at publish start and
/// no lock is held while handlers run, so a handler may subscribe or
/// unsubscribe reentrantly; it will see the change take effect from the
/// next publish onward.
pub struct InProcessEventBus {
    /// Registered handlers in subscription order.
    handlers: RwLock<Vec<(SubscriptionToken, Arc<dyn EventHandler>)>>,

    /// Source for the next subscription token.
    next_token: AtomicU64,

    /// Total events published.
    events_published: AtomicU64,
}

impl InProcessEventBus {
    /// Create a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_token: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
        }
    }

    /// Register a handler for all subsequent publishes.
    ///
    /// Returns the token that identifies this subscription to
    /// [`unsubscribe`](Self::unsubscribe).
    #[must_use]
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));

        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push((token, handler));
        }

        debug!(token = token.0, "New subscription created");
        token
    }

    /// Register a closure as a handler.
    #[must_use]
    pub fn subscribe_fn<F>(&self, f: F) -> SubscriptionToken
    where
        F: Fn(&PickupEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnHandler(f)))
    }

    /// Remove a subscription.
    ///
    /// Returns `true` when the token was registered, `false` when it was
    /// unknown or already removed. Unknown tokens are a no-op.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let Ok(mut handlers) = self.handlers.write() else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(t, _)| *t != token);
        let removed = handlers.len() < before;

        if removed {
            debug!(token = token.0, "Subscription removed");
        }
        removed
    }

    /// Get the number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().map_or(0, |handlers| handlers.len())
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: &PickupEvent) -> usize {
        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        // Snapshot the handler list, then deliver without holding the
        // lock so handlers can re-enter the bus.
        let snapshot: Vec<Arc<dyn EventHandler>> = match self.handlers.read() {
            Ok(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
            Err(_) => Vec::new(),
        };

        if snapshot.is_empty() {
            warn!(kind = event.kind(), "Event dropped (no subscribers)");
            return 0;
        }

        let mut delivered = 0;
        for handler in &snapshot {
            if let Err(e) = handler.handle(event) {
                warn!(kind = event.kind(), error = %e, "Event handler failed");
            }
            delivered += 1;
        }

        debug!(kind = event.kind(), receivers = delivered, "Event published");
        delivered
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
