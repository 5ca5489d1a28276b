//! # Registry Domain
//!
//! Error types for registry operations and the persistence boundary.

pub mod errors;

pub use errors::{PersistenceError, RegistryError};
