//! # Plate Registry (curbside-registry)
//!
//! The registry is the authoritative owner of all plate-to-child records.
//! Every other subsystem reads through it and mutates through it; nothing
//! else holds a mutable copy.
//!
//! ## Write Path
//!
//! ```text
//! caller ──→ [mutation lock] ──→ validate ──→ PlateStore.save(snapshot)
//!                                                    │
//!                              commit to memory ←────┘ (only on success)
//! ```
//!
//! Every mutation persists the candidate snapshot through the injected
//! [`PlateStore`] **before** the in-memory map is touched, so a failed
//! save leaves the registry exactly as it was.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Unique Keys | At most one record per normalized plate |
//! | Named Child | `childName` is never empty |
//! | Forward Arrivals | `lastArrival` never moves backward, never clears |
//! | Durable Writes | Memory reflects only successfully persisted state |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Registry and persistence error types
//! - `ports/` - Outbound port traits plus the bundled store adapters
//! - `service/` - The [`PlateRegistry`] application service

pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::errors::{PersistenceError, RegistryError};
pub use ports::outbound::{Clock, JsonFileStore, ManualClock, MemoryStore, PlateStore, SystemClock};
pub use service::{PlateRegistry, PlateUpdate, RecordedArrival};
