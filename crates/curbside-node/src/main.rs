//! # Curbside Node
//!
//! The main entry point for the curbside pickup node.
//!
//! ## Pipeline
//!
//! ```text
//! Camera / curl / simulator
//!         │  POST /api/plate {"plateNumber": "..."}
//!         ▼
//! ┌──────────────────┐      ┌───────────────────┐
//! │  HTTP transport  │      │ Channel transport │
//! └────────┬─────────┘      └─────────┬─────────┘
//!          └────────────┬─────────────┘
//!                       ▼
//!               Ingress adapter
//!                       │
//!                       ▼
//!              Arrival processor ──── Plate registry ──── Plate store
//!                       │
//!                       ▼  PickupEvent::Arrival
//!                  Event bus
//!               ┌───────┴───────┐
//!               ▼               ▼
//!          Staff log     Client notifications
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (RUST_LOG wins, `info` otherwise)
//! 2. Load configuration from CURBSIDE_* environment variables
//! 3. Start the runtime (registry, bus, transports, optional probe)
//! 4. Run until Ctrl+C, then shut down gracefully

mod config;
mod runtime;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::NodeConfig;
use crate::runtime::NodeRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = NodeConfig::from_env();

    // Wire and start every subsystem
    let runtime = NodeRuntime::start(config).await?;

    // Keep the node running
    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}
