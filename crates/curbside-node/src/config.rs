//! # Node Configuration
//!
//! Defaults plus `CURBSIDE_*` environment overrides. A malformed override
//! logs a warning and leaves the default in place; only values the node
//! genuinely cannot run with are rejected by [`NodeConfig::validate`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use curbside_gateway::HttpConfig;
use tracing::warn;

/// Which plate store backs the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Records live only for the lifetime of the process.
    Memory,
    /// Records persist to `plates.json` under the data directory.
    File,
}

/// Node settings, assembled from defaults and environment overrides.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// HTTP listen address (`CURBSIDE_LISTEN_ADDR`).
    pub listen_addr: SocketAddr,
    /// Store selection (`CURBSIDE_STORAGE`, `memory` or `file`).
    pub storage: StorageBackend,
    /// Data directory for the file store (`CURBSIDE_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Whether an empty registry is seeded with the demo records
    /// (`CURBSIDE_SEED_DEMO`).
    pub seed_demo_data: bool,
    /// Upstream feed to probe (`CURBSIDE_UPSTREAM_ADDR`). Probing is off
    /// when unset.
    pub upstream_addr: Option<SocketAddr>,
    /// Time between upstream probes (`CURBSIDE_PROBE_INTERVAL_SECS`).
    pub probe_interval: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: HttpConfig::default().listen_addr,
            storage: StorageBackend::File,
            data_dir: PathBuf::from("data"),
            seed_demo_data: true,
            upstream_addr: None,
            probe_interval: Duration::from_secs(5),
        }
    }
}

impl NodeConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("CURBSIDE_LISTEN_ADDR") {
            match value.parse() {
                Ok(addr) => config.listen_addr = addr,
                Err(_) => warn!(
                    value = %value,
                    "CURBSIDE_LISTEN_ADDR is not a socket address, keeping default"
                ),
            }
        }

        if let Some(value) = lookup("CURBSIDE_STORAGE") {
            match value.to_ascii_lowercase().as_str() {
                "memory" => config.storage = StorageBackend::Memory,
                "file" => config.storage = StorageBackend::File,
                _ => warn!(
                    value = %value,
                    "CURBSIDE_STORAGE must be 'memory' or 'file', keeping default"
                ),
            }
        }

        if let Some(value) = lookup("CURBSIDE_DATA_DIR") {
            config.data_dir = PathBuf::from(value);
        }

        if let Some(value) = lookup("CURBSIDE_SEED_DEMO") {
            match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.seed_demo_data = true,
                "0" | "false" | "no" => config.seed_demo_data = false,
                _ => warn!(
                    value = %value,
                    "CURBSIDE_SEED_DEMO must be a boolean, keeping default"
                ),
            }
        }

        if let Some(value) = lookup("CURBSIDE_UPSTREAM_ADDR") {
            match value.parse() {
                Ok(addr) => config.upstream_addr = Some(addr),
                Err(_) => warn!(
                    value = %value,
                    "CURBSIDE_UPSTREAM_ADDR is not a socket address, probing stays off"
                ),
            }
        }

        if let Some(value) = lookup("CURBSIDE_PROBE_INTERVAL_SECS") {
            match value.parse::<u64>() {
                Ok(secs) => config.probe_interval = Duration::from_secs(secs),
                Err(_) => warn!(
                    value = %value,
                    "CURBSIDE_PROBE_INTERVAL_SECS is not a number, keeping default"
                ),
            }
        }

        config
    }

    /// Reject settings the node cannot start with.
    ///
    /// # Errors
    ///
    /// Fails on a zero probe interval; the probe loop cannot tick on one.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.probe_interval.is_zero() {
            bail!("CURBSIDE_PROBE_INTERVAL_SECS must be greater than zero");
        }
        Ok(())
    }
}
