//! Newest-first history of calculation records.
//!
//! The whole collection is written through to a [`KeyValueStore`] on every
//! mutation. Without a backend the store keeps working in memory only.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::stain_pipeline::common::error::{Result, StainError};
use crate::stain_pipeline::estimation::CalculationRecord;
use crate::stain_pipeline::storage::kv::KeyValueStore;
use crate::stain_pipeline::storage::types::HistorySummary;

/// Key holding the serialized collection.
pub const STORAGE_KEY: &str = "stain_calculations";

pub type Snapshot = Arc<Vec<CalculationRecord>>;

pub struct ResultStore {
    backend: Option<Arc<dyn KeyValueStore>>,
    records: RwLock<Vec<CalculationRecord>>,
    changes: watch::Sender<Snapshot>,
}

impl ResultStore {
    /// Opens the store and loads any persisted history.
    ///
    /// Malformed or inconsistent entries are skipped; only a failing read
    /// from the backend is an error.
    pub async fn open(backend: Option<Arc<dyn KeyValueStore>>) -> Result<Self> {
        let records = match &backend {
            Some(store) => match store.get(STORAGE_KEY).await? {
                Some(raw) => decode_collection(&raw),
                None => Vec::new(),
            },
            None => {
                debug!("No persistence backend, history is in-memory only");
                Vec::new()
            }
        };

        info!(records = records.len(), "Calculation history loaded");

        let (changes, _) = watch::channel(Arc::new(records.clone()));
        Ok(Self {
            backend,
            records: RwLock::new(records),
            changes,
        })
    }

    pub fn in_memory() -> Self {
        let (changes, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            backend: None,
            records: RwLock::new(Vec::new()),
            changes,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    /// Inserts `record` at the front.
    ///
    /// # Errors
    ///
    /// * [`StainError::InvalidInput`] - a record with the same id exists
    /// * [`StainError::Persistence`] - the write failed; memory is still updated
    pub async fn append(&self, record: CalculationRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StainError::InvalidInput(format!(
                "duplicate calculation id: {}",
                record.id
            )));
        }

        debug!(id = %record.id, "Appending calculation");
        records.insert(0, record);
        self.commit(&records).await
    }

    pub async fn list(&self) -> Vec<CalculationRecord> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<CalculationRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Removes the record with `id` and returns it.
    ///
    /// # Errors
    ///
    /// * [`StainError::NotFound`] - no such id; nothing changes
    /// * [`StainError::Persistence`] - the write failed; memory is still updated
    pub async fn delete_by_id(&self, id: &str) -> Result<CalculationRecord> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StainError::NotFound(id.to_string()))?;

        let removed = records.remove(index);
        debug!(id = %removed.id, "Deleted calculation");
        self.commit(&records).await?;
        Ok(removed)
    }

    pub async fn clear(&self) -> Result<()> {
        let mut records = self.records.write().await;
        records.clear();
        debug!("Cleared calculation history");
        self.commit(&records).await
    }

    pub async fn summary(&self) -> HistorySummary {
        HistorySummary::from_records(&self.records.read().await)
    }

    /// Receiver that sees the full collection after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.changes.subscribe()
    }

    // Called with the write lock held, which serializes persistence cycles.
    async fn commit(&self, records: &[CalculationRecord]) -> Result<()> {
        self.changes.send_replace(Arc::new(records.to_vec()));

        let Some(backend) = &self.backend else {
            return Ok(());
        };

        let json = serde_json::to_string(records)?;
        backend.set(STORAGE_KEY, &json).await.inspect_err(|e| {
            warn!(error = %e, "History kept in memory but not persisted");
        })
    }
}

/// Parses a persisted collection, keeping every entry that is well formed.
fn decode_collection(raw: &str) -> Vec<CalculationRecord> {
    let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Stored history is not a list, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<CalculationRecord>(entry) {
            Ok(record) if !record.is_consistent() => {
                warn!(index, id = %record.id, "Skipping inconsistent stored calculation");
            }
            Ok(record) if !seen.insert(record.id.clone()) => {
                warn!(index, id = %record.id, "Skipping duplicate stored calculation");
            }
            Ok(record) => records.push(record),
            Err(e) => warn!(index, error = %e, "Skipping malformed stored calculation"),
        }
    }

    records
}
