//! # Curbside Test Suite
//!
//! Unified test crate for flows that span more than one curbside crate.
//! Single-crate behavior is covered by each crate's inline tests; this
//! crate wires real components together the way the node does and checks
//! the end-to-end contracts.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── pipeline.rs     # Submission outcomes through the shared ingress
//!     ├── transports.rs   # HTTP / channel / simulator parity
//!     ├── persistence.rs  # Durable round trips and rollback
//!     └── concurrency.rs  # Concurrent ingestion storms
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p curbside-tests
//!
//! # By category
//! cargo test -p curbside-tests integration::pipeline::
//! cargo test -p curbside-tests integration::concurrency::
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
