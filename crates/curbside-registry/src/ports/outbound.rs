//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the registry service: durable record storage
//! and a time source. These are the interfaces the host application picks
//! implementations for at startup.

use crate::domain::errors::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curbside_types::PlateRecord;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::io::AsyncWriteExt;

/// File name of the record store inside the data directory.
///
/// The stored document is a JSON array of records, the same shape the
/// admin API returns, so the file can be inspected or edited by hand.
pub const STORAGE_FILE: &str = "plates.json";

/// Abstract interface for durable record storage.
///
/// `save` replaces the full stored sequence; there are no partial
/// updates. Either the entire snapshot lands or the previous contents
/// remain, and the registry relies on that to keep memory and disk in
/// step.
#[async_trait]
pub trait PlateStore: Send + Sync {
    /// Load every stored record. A store with no prior data returns an
    /// empty sequence, not an error.
    async fn load(&self) -> Result<Vec<PlateRecord>, PersistenceError>;

    /// Atomically replace the stored sequence with `records`.
    async fn save(&self, records: &[PlateRecord]) -> Result<(), PersistenceError>;
}

/// Abstract interface for time operations (for testability).
pub trait Clock: Send + Sync {
    /// Get the current instant.
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// Production: JsonFileStore / SystemClock
// Testing: MemoryStore / ManualClock
// =============================================================================

/// Default time source using system time.
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually controlled clock for tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock forward (or backward, with a negative delta).
    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory store for unit tests and ephemeral deployments.
///
/// Saves can be armed to fail once, which is how tests exercise the
/// registry's persist-before-commit rollback path.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<PlateRecord>>,
    fail_next_save: AtomicBool,
    save_count: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: Vec<PlateRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_next_save: AtomicBool::new(false),
            save_count: AtomicU64::new(0),
        }
    }

    /// Arm the store so the next `save` fails with an I/O error.
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the currently stored records, for assertions.
    #[must_use]
    pub fn stored(&self) -> Vec<PlateRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlateStore for MemoryStore {
    async fn load(&self) -> Result<Vec<PlateRecord>, PersistenceError> {
        Ok(self.stored())
    }

    async fn save(&self, records: &[PlateRecord]) -> Result<(), PersistenceError> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(PersistenceError::Io {
                message: "simulated save failure".to_string(),
            });
        }

        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = records.to_vec();
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// File-backed store holding the records as a JSON array.
///
/// Writes go to a sibling temp file, are synced, and are renamed over
/// the real file, so a crash mid-save leaves the previous contents
/// intact. A missing file loads as the empty sequence.
pub struct JsonFileStore {
    data_dir: PathBuf,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `data_dir`. The directory is created on
    /// the first save if it does not exist yet.
    #[must_use]
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let file_path = data_dir.join(STORAGE_FILE);

        match std::fs::metadata(&file_path) {
            Ok(metadata) => tracing::info!(
                path = %file_path.display(),
                bytes = metadata.len(),
                "[registry] Found existing storage file"
            ),
            Err(_) => tracing::info!(
                path = %file_path.display(),
                "[registry] No existing storage file"
            ),
        }

        Self {
            data_dir,
            file_path,
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[async_trait]
impl PlateStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<PlateRecord>, PersistenceError> {
        let bytes = match tokio::fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&e)),
        };

        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::serialization(&e))
    }

    async fn save(&self, records: &[PlateRecord]) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| PersistenceError::io(&e))?;

        let json =
            serde_json::to_vec_pretty(records).map_err(|e| PersistenceError::serialization(&e))?;

        // Write atomically via temp file
        let temp_path = self.file_path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| PersistenceError::io(&e))?;
        file.write_all(&json)
            .await
            .map_err(|e| PersistenceError::io(&e))?;
        file.sync_all().await.map_err(|e| PersistenceError::io(&e))?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.file_path)
            .await
            .map_err(|e| PersistenceError::io(&e))
    }
}
