//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::PickupEvent;
use std::sync::Arc;

/// Error type a handler may return.
///
/// Delivery reports it through the diagnostic log and continues with the
/// remaining handlers; it never propagates to the publisher.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An observer registered with the bus.
///
/// Handlers run synchronously inside `publish`, so they should finish
/// quickly; long-running work belongs behind a channel or a spawned task.
/// A handler may call back into the bus (subscribe or unsubscribe) from
/// within `handle`.
pub trait EventHandler: Send + Sync {
    /// React to one published event.
    fn handle(&self, event: &PickupEvent) -> Result<(), HandlerError>;
}

/// Adapter that lets a plain closure act as an [`EventHandler`].
pub(crate) struct FnHandler<F>(pub(crate) F);

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&PickupEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &PickupEvent) -> Result<(), HandlerError> {
        (self.0)(event)
    }
}

impl<T: EventHandler + ?Sized> EventHandler for Arc<T> {
    fn handle(&self, event: &PickupEvent) -> Result<(), HandlerError> {
        (**self).handle(event)
    }
}

/// Opaque handle identifying one subscription.
///
/// Returned by `subscribe` and consumed by `unsubscribe`. Tokens are never
/// reused within the lifetime of a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(pub(crate) u64);
