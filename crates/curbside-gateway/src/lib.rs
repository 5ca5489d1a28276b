//! # Ingress Gateway (curbside-gateway)
//!
//! Transport adapters in front of the arrival pipeline, plus the
//! outbound surfaces a node exposes to clients.
//!
//! ## Submission Path
//!
//! ```text
//! HTTP POST /api/plate ──┐
//! channel submission ────┼──→ IngressAdapter ──→ ArrivalProcessor
//! camera simulator ──────┘         │
//!                                  └──→ IngressReply (status + envelope)
//! ```
//!
//! Every transport funnels through the same [`IngressAdapter`], so a
//! reading is handled identically no matter how it arrived. Transports
//! only translate between their wire and [`IngressReply`].
//!
//! ## Outbound Surfaces
//!
//! - [`NotificationChannel`] - client-facing broadcast of recognized plates
//! - [`UpstreamMonitor`] - reachability probe for the recognition feed
//! - Administrative HTTP routes for managing the registry
//!
//! ## Crate Structure
//!
//! - `ingress` - Transport-agnostic submission handling
//! - `wire` - Reply envelopes and request bodies (private)
//! - `http` / `channel` / `simulator` - The three transports
//! - `notify` / `probe` - Outbound notification and monitoring

pub mod channel;
pub mod error;
pub mod http;
pub mod ingress;
pub mod notify;
pub mod probe;
pub mod simulator;
mod wire;

// Re-export key types for convenience
pub use channel::ChannelTransport;
pub use error::GatewayError;
pub use http::{AppState, HttpConfig, HttpTransport, DEFAULT_LISTEN_ADDR};
pub use ingress::{IngressAdapter, IngressReply, StatusCategory};
pub use notify::{ClientMessage, NotificationChannel};
pub use probe::{ProbeConfig, UpstreamMonitor};
pub use simulator::CameraSimulator;
