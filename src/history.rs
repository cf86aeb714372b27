//! Scan history.
//!
//! Every completed analysis becomes one `ScanRecord`. The whole history is
//! stored as a JSON array under a single key of a `KeyValueStore` and is
//! always handed out newest first.
//!
//! Mutations take `&mut self`, so within a process the read-modify-write of
//! the list cannot interleave with another writer holding the same store.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::archive::ImageArchive;
use crate::error::{Error, Result};
use crate::export::Exporter;
use crate::store::KeyValueStore;

pub const DEFAULT_HISTORY_KEY: &str = "scan_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted capture-and-classify cycle. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Usually a path inside the image archive; may be the original
    /// transient path when archiving failed.
    pub image_uri: String,
    pub overall_risk: RiskLevel,
    pub main_condition: String,
    /// 0..=1, not clamped here
    pub confidence: f64,
}

impl ScanRecord {
    /// Fresh record with a new id, stamped now.
    pub fn new(
        image_uri: impl Into<String>,
        overall_risk: RiskLevel,
        main_condition: impl Into<String>,
        confidence: f64,
    ) -> Self {
        ScanRecord {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            image_uri: image_uri.into(),
            overall_risk,
            main_condition: main_condition.into(),
            confidence,
        }
    }

    pub fn image_path(&self) -> &Path {
        Path::new(&self.image_uri)
    }
}

pub struct HistoryStore<S> {
    kv: S,
    key: String,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(kv: S, key: impl Into<String>) -> Self {
        HistoryStore { kv, key: key.into() }
    }

    pub fn with_default_key(kv: S) -> Self {
        Self::new(kv, DEFAULT_HISTORY_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn into_inner(self) -> S {
        self.kv
    }

    /// All records, newest first. A missing, unreadable or malformed history
    /// reads as empty.
    pub fn list(&self) -> Vec<ScanRecord> {
        match self.read() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "treating history as empty");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<ScanRecord> {
        self.list().into_iter().find(|r| r.id == id)
    }

    /// Stores `record` at the front of the history.
    ///
    /// Unlike `list`, a malformed stored history is an error here: rewriting
    /// it would silently drop whatever the old document held.
    pub fn add(&mut self, record: ScanRecord) -> Result<()> {
        let mut records = self.read()?;

        if records.iter().any(|r| r.id == record.id) {
            return Err(Error::DuplicateId(record.id));
        }

        tracing::debug!(id = %record.id, risk = %record.overall_risk, "adding scan record");
        records.insert(0, record);
        self.write(&records)
    }

    /// Removes the record with `id` and returns it. Absent ids are a no-op.
    ///
    /// With `delete_image`, the record's image is removed too, provided the
    /// archive owns it. A failed image delete is logged, the record stays gone.
    pub fn delete(
        &mut self,
        id: &str,
        delete_image: bool,
        archive: &ImageArchive,
    ) -> Result<Option<ScanRecord>> {
        let mut records = self.list();

        let Some(idx) = records.iter().position(|r| r.id == id) else {
            tracing::debug!(id, "delete of unknown scan record ignored");
            return Ok(None);
        };

        let removed = records.remove(idx);
        self.write(&records)?;

        if delete_image && !removed.image_uri.is_empty() {
            if let Err(e) = archive.delete(removed.image_path()) {
                tracing::warn!(id, image = %removed.image_uri, error = %e, "failed to delete archived image");
            }
        }

        Ok(Some(removed))
    }

    /// Drops every record. Archived images are left alone.
    pub fn clear(&mut self) -> Result<()> {
        self.kv.remove(&self.key).map_err(|e| self.write_failed(e))
    }

    /// Writes the history export document, `None` when there is nothing to export.
    pub fn export(&self, exporter: &Exporter) -> Result<Option<PathBuf>> {
        exporter.write_history(&self.list())
    }

    fn read(&self) -> Result<Vec<ScanRecord>> {
        let read_failed = |reason: String| Error::PersistenceReadFailed {
            key: self.key.clone(),
            reason,
        };

        let Some(raw) = self.kv.get(&self.key).map_err(|e| read_failed(e.to_string()))? else {
            return Ok(Vec::new());
        };

        let mut records: Vec<ScanRecord> =
            serde_json::from_str(&raw).map_err(|e| read_failed(e.to_string()))?;

        // stable, so equal timestamps keep storage order (front = added last)
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn write(&mut self, records: &[ScanRecord]) -> Result<()> {
        let json = serde_json::to_string(records).map_err(|e| self.write_failed(e.into()))?;
        self.kv.set(&self.key, &json).map_err(|e| self.write_failed(e))
    }

    fn write_failed(&self, e: Error) -> Error {
        match e {
            Error::PersistenceWriteFailed { .. } => e,
            other => Error::PersistenceWriteFailed {
                key: self.key.clone(),
                reason: other.to_string(),
            },
        }
    }
}
