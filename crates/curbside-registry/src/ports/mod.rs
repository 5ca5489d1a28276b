//! # Ports
//!
//! Dependency seams for the registry service (hexagonal architecture).
//! The service depends on these traits only; the adapters bundled in
//! `outbound` cover in-memory and file-backed deployments.

pub mod outbound;

pub use outbound::{Clock, JsonFileStore, ManualClock, MemoryStore, PlateStore, SystemClock};
