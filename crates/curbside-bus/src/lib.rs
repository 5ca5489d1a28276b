//! # Curbside Bus - Event Bus for Arrival Notifications
//!
//! Connects the arrival pipeline to its observers without coupling either
//! side to the other.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌────────────────┐                      ┌────────────────┐
//! │ Arrival        │                      │ Staff log      │
//! │ Processor      │     publish()        │ observer       │
//! │                │ ───────┐             │                │
//! └────────────────┘        │             └────────────────┘
//!                           ▼                     ↑
//!                    ┌────────────────┐           │
//!                    │   Event Bus    │ ──────────┘
//!                    │                │   subscribe() → token
//!                    └────────────────┘
//! ```
//!
//! - Delivery is **synchronous**: every registered handler has run by the
//!   time `publish` returns, in subscription order.
//! - Handlers are **isolated**: one handler's error is reported to the
//!   diagnostic log and the remaining handlers still run.
//! - Subscriptions are **explicit**: `subscribe` hands back a token and
//!   `unsubscribe` takes it; there is no queueing and no replay for late
//!   subscribers.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::PickupEvent;
pub use publisher::{EventPublisher, InProcessEventBus};
pub use subscriber::{EventHandler, HandlerError, SubscriptionToken};
