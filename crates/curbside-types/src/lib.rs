//! # Curbside Types Crate
//!
//! This crate contains the domain entities shared by every curbside
//! subsystem: the registry, the arrival processor, the ingress gateway,
//! and the event bus.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Canonical Keys**: A [`PlateNumber`] can only be constructed through
//!   normalization, so two readings of the same physical plate always
//!   compare equal.
//! - **Boundary Shapes**: Persisted and wire field names are camelCase and
//!   identical, so the stored file and the API speak the same dialect.

pub mod entities;
pub mod errors;
pub mod outcome;

pub use entities::{ArrivalEvent, PlateNumber, PlateRecord};
pub use errors::PlateParseError;
pub use outcome::{IngestionResult, RejectReason};
