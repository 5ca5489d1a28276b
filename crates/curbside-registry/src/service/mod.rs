//! # Plate Registry Service
//!
//! The application service owning the plate records. All reads return
//! copies and all mutations run under one lock, so callers never observe
//! a half-applied change.

use crate::domain::errors::RegistryError;
use crate::ports::outbound::PlateStore;
use chrono::{DateTime, Utc};
use curbside_types::{PlateNumber, PlateRecord};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Outcome of recording an arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedArrival {
    /// The record after the call, including its `lastArrival`.
    pub record: PlateRecord,
    /// Whether the stored timestamp strictly moved forward. A re-delivery
    /// carrying the already-recorded instant returns `false`, and callers
    /// use that to suppress duplicate notifications.
    pub advanced: bool,
}

/// Partial update applied to an existing record.
///
/// `None` fields are left untouched. A provided child name must be
/// non-empty after trimming; provided notes replace the stored notes,
/// and a blank string clears them.
#[derive(Debug, Clone, Default)]
pub struct PlateUpdate {
    /// Replacement child name, if any.
    pub child_name: Option<String>,
    /// Replacement notes, if any. Blank clears the field.
    pub notes: Option<String>,
}

impl PlateUpdate {
    fn is_empty(&self) -> bool {
        self.child_name.is_none() && self.notes.is_none()
    }
}

/// The authoritative owner of all plate-to-child records.
///
/// State lives in a single map guarded by one async mutex; the lock is
/// held across the persistence call so memory only ever reflects
/// successfully saved snapshots.
pub struct PlateRegistry {
    store: Arc<dyn PlateStore>,
    records: Mutex<HashMap<PlateNumber, PlateRecord>>,
}

impl std::fmt::Debug for PlateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlateRegistry")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl PlateRegistry {
    /// Build a registry from the store's current contents.
    ///
    /// Stored duplicates (possible in a hand-edited file) keep the first
    /// occurrence; records with a blank child name are dropped. Neither
    /// triggers a rewrite of the store.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Persistence`] when the store cannot be read.
    pub async fn load(store: Arc<dyn PlateStore>) -> Result<Self, RegistryError> {
        let loaded = store.load().await?;

        let mut records = HashMap::with_capacity(loaded.len());
        for record in loaded {
            if record.child_name.trim().is_empty() {
                warn!(
                    plate = %record.plate_number,
                    "[registry] Dropping stored record with blank child name"
                );
                continue;
            }
            match records.entry(record.plate_number.clone()) {
                Entry::Occupied(_) => {
                    warn!(
                        plate = %record.plate_number,
                        "[registry] Duplicate plate in stored data, keeping first"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }

        info!(count = records.len(), "[registry] Loaded plate records");
        Ok(Self {
            store,
            records: Mutex::new(records),
        })
    }

    /// Register a new plate.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateKey`] when the plate already exists
    /// - [`RegistryError::EmptyChildName`] when the name is blank
    /// - [`RegistryError::Persistence`] when the save fails (state unchanged)
    pub async fn add(
        &self,
        plate: PlateNumber,
        child_name: &str,
        notes: Option<String>,
    ) -> Result<PlateRecord, RegistryError> {
        let child_name = child_name.trim();
        if child_name.is_empty() {
            return Err(RegistryError::EmptyChildName);
        }

        let mut records = self.records.lock().await;
        if records.contains_key(&plate) {
            return Err(RegistryError::DuplicateKey { plate });
        }

        let record = PlateRecord::new(plate.clone(), child_name.to_string(), trim_notes(notes));

        let snapshot = sorted_snapshot(
            records
                .values()
                .cloned()
                .chain(std::iter::once(record.clone())),
        );
        self.store.save(&snapshot).await?;

        records.insert(plate, record.clone());
        info!(plate = %record.plate_number, child = %record.child_name, "[registry] Plate registered");
        Ok(record)
    }

    /// Apply a partial update to an existing record.
    ///
    /// `lastArrival` is never touched by this path.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] when the plate is unknown
    /// - [`RegistryError::EmptyChildName`] when a provided name is blank
    /// - [`RegistryError::Persistence`] when the save fails (state unchanged)
    pub async fn update_fields(
        &self,
        plate: &PlateNumber,
        update: PlateUpdate,
    ) -> Result<PlateRecord, RegistryError> {
        let mut records = self.records.lock().await;
        let current = records
            .get(plate)
            .ok_or_else(|| RegistryError::NotFound {
                plate: plate.clone(),
            })?;

        // A field-less update is a read; skip the store round trip.
        if update.is_empty() {
            return Ok(current.clone());
        }

        let mut updated = current.clone();
        if let Some(child_name) = update.child_name {
            let child_name = child_name.trim().to_string();
            if child_name.is_empty() {
                return Err(RegistryError::EmptyChildName);
            }
            updated.child_name = child_name;
        }
        if let Some(notes) = update.notes {
            updated.notes = trim_notes(Some(notes));
        }

        let snapshot = sorted_snapshot(replacing(&records, updated.clone()));
        self.store.save(&snapshot).await?;

        records.insert(plate.clone(), updated.clone());
        debug!(plate = %plate, "[registry] Plate updated");
        Ok(updated)
    }

    /// Delete a record, returning it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] when the plate is unknown
    /// - [`RegistryError::Persistence`] when the save fails (state unchanged)
    pub async fn remove(&self, plate: &PlateNumber) -> Result<PlateRecord, RegistryError> {
        let mut records = self.records.lock().await;
        if !records.contains_key(plate) {
            return Err(RegistryError::NotFound {
                plate: plate.clone(),
            });
        }

        let snapshot = sorted_snapshot(
            records
                .values()
                .filter(|r| r.plate_number != *plate)
                .cloned(),
        );
        self.store.save(&snapshot).await?;

        // Checked above; the map cannot have changed under the held lock.
        let removed = records.remove(plate).ok_or_else(|| RegistryError::NotFound {
            plate: plate.clone(),
        })?;
        info!(plate = %plate, "[registry] Plate removed");
        Ok(removed)
    }

    /// Record an arrival observed at `at`.
    ///
    /// The stored timestamp only ever moves forward. An equal timestamp
    /// is absorbed without a write and reported as `advanced: false`;
    /// an older one is refused outright.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] when the plate is unknown
    /// - [`RegistryError::StaleTimestamp`] when `at` precedes the record
    /// - [`RegistryError::Persistence`] when the save fails (state unchanged)
    pub async fn record_arrival(
        &self,
        plate: &PlateNumber,
        at: DateTime<Utc>,
    ) -> Result<RecordedArrival, RegistryError> {
        let mut records = self.records.lock().await;
        let current = records
            .get(plate)
            .ok_or_else(|| RegistryError::NotFound {
                plate: plate.clone(),
            })?;

        if let Some(stored) = current.last_arrival {
            if at < stored {
                return Err(RegistryError::StaleTimestamp {
                    stored,
                    attempted: at,
                });
            }
        }

        let advanced = current.last_arrival.map_or(true, |stored| at > stored);
        let mut updated = current.clone();
        updated.last_arrival = Some(at);

        if advanced {
            let snapshot = sorted_snapshot(replacing(&records, updated.clone()));
            self.store.save(&snapshot).await?;
            records.insert(plate.clone(), updated.clone());
            debug!(plate = %plate, at = %at, "[registry] Arrival recorded");
        }

        Ok(RecordedArrival {
            record: updated,
            advanced,
        })
    }

    /// Look up a record by normalized plate.
    pub async fn find(&self, plate: &PlateNumber) -> Option<PlateRecord> {
        self.records.lock().await.get(plate).cloned()
    }

    /// All records, sorted by plate.
    pub async fn list(&self) -> Vec<PlateRecord> {
        sorted_snapshot(self.records.lock().await.values().cloned())
    }

    /// Number of registered plates.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the registry holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

/// Trim notes; a blank value collapses to absent.
fn trim_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// All records except the replacement's plate, plus the replacement.
fn replacing(
    records: &HashMap<PlateNumber, PlateRecord>,
    replacement: PlateRecord,
) -> impl Iterator<Item = PlateRecord> + '_ {
    let replacement_plate = replacement.plate_number.clone();
    records
        .values()
        .filter(move |r| r.plate_number != replacement_plate)
        .cloned()
        .chain(std::iter::once(replacement))
}

/// Collect into a plate-ordered vector so saved files are stable.
fn sorted_snapshot(records: impl Iterator<Item = PlateRecord>) -> Vec<PlateRecord> {
    let mut snapshot: Vec<PlateRecord> = records.collect();
    snapshot.sort_by(|a, b| a.plate_number.cmp(&b.plate_number));
    snapshot
}
