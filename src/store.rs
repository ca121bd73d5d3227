// src/store.rs
//! Per-category history of ranking snapshots, plus the persistence seam.
//!
//! The in-memory `HistoryStore` enforces the dedup invariant (no two rows
//! share a `(timestamp, name)` key; a later write replaces the earlier one).
//! Persistence goes through the `HistoryBackend` trait so the engine itself
//! never touches the filesystem; the bundled `CsvBackend` keeps one CSV per
//! category and overwrites it atomically via a temp file + rename.
//!
//! Single-writer assumption: callers must not `save` the same category from
//! two writers concurrently; the backend does not serialize them.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::snapshot::RankedItem;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history io: {0}")]
    Io(#[from] std::io::Error),
    #[error("history csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("persisting history: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Accumulated, deduplicated record of all snapshots for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStore {
    category: String,
    rows: Vec<RankedItem>,
}

impl HistoryStore {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            rows: Vec::new(),
        }
    }

    /// Build a store from raw rows, applying the dedup invariant in
    /// insertion order (last write wins per `(timestamp, name)`).
    pub fn from_rows(category: impl Into<String>, rows: Vec<RankedItem>) -> Self {
        let mut store = Self::new(category);
        for row in rows {
            store.upsert(row);
        }
        store
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[RankedItem] {
        &self.rows
    }

    /// Insert a row, replacing any existing row with the same
    /// `(timestamp, name)` key.
    pub fn upsert(&mut self, row: RankedItem) {
        match self
            .rows
            .iter()
            .position(|r| r.timestamp == row.timestamp && r.name == row.name)
        {
            Some(i) => self.rows[i] = row,
            None => self.rows.push(row),
        }
    }

    /// Latest timestamp strictly before `ts`, if any.
    pub fn latest_timestamp_before(&self, ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.rows
            .iter()
            .map(|r| r.timestamp)
            .filter(|t| *t < ts)
            .max()
    }

    /// Rows recorded at exactly `ts`, in insertion order.
    pub fn rows_at(&self, ts: DateTime<Utc>) -> impl Iterator<Item = &RankedItem> {
        self.rows.iter().filter(move |r| r.timestamp == ts)
    }

    /// Canonical export order: stable sort by `(timestamp, rank)` ascending,
    /// absent ranks after ranked rows at the same timestamp.
    pub fn sorted_rows(&self) -> Vec<RankedItem> {
        let mut out = self.rows.clone();
        out.sort_by_key(|r| (r.timestamp, r.rank.unwrap_or(u32::MAX)));
        out
    }
}

/// Persistence seam for the history of one category.
///
/// `load` returns an empty store when no prior data exists — absence is not
/// an error, so call sites have a single code path. `save` is an idempotent
/// full overwrite and must be all-or-nothing from the caller's point of view.
pub trait HistoryBackend: Send + Sync {
    fn load(&self, category: &str) -> Result<HistoryStore, StoreError>;
    fn save(&self, store: &HistoryStore) -> Result<(), StoreError>;

    /// Where the category's history lives on disk, if it is file-backed.
    /// Used to hand exports to the delivery collaborator.
    fn export_path(&self, _category: &str) -> Option<PathBuf> {
        None
    }
}

/// One `<category>_rankings.csv` per category under a data directory.
#[derive(Debug, Clone)]
pub struct CsvBackend {
    dir: PathBuf,
}

impl CsvBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, category: &str) -> PathBuf {
        self.dir.join(format!("{category}_rankings.csv"))
    }
}

impl HistoryBackend for CsvBackend {
    fn load(&self, category: &str) -> Result<HistoryStore, StoreError> {
        let path = self.path(category);
        if !path.exists() {
            debug!(category, "no prior history, starting empty");
            return Ok(HistoryStore::new(category));
        }
        let mut rdr = csv::Reader::from_path(&path)?;
        let mut rows = Vec::new();
        for rec in rdr.deserialize::<RankedItem>() {
            rows.push(rec?);
        }
        Ok(HistoryStore::from_rows(category, rows))
    }

    fn save(&self, store: &HistoryStore) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write the full table to a temp file in the same directory, then
        // rename over the target so a failed write leaves it unchanged.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut wtr = csv::Writer::from_writer(&mut tmp);
            for row in store.sorted_rows() {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        tmp.persist(self.path(store.category()))?;
        Ok(())
    }

    fn export_path(&self, category: &str) -> Option<PathBuf> {
        Some(self.path(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(ts: DateTime<Utc>, name: &str, rank: Option<u32>) -> RankedItem {
        RankedItem {
            timestamp: ts,
            category: "skincare".into(),
            rank,
            brand: None,
            name: name.into(),
            original_price: None,
            sale_price: None,
            discount_percent: None,
            status: None,
        }
    }

    #[test]
    fn upsert_replaces_on_same_key() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let mut store = HistoryStore::new("skincare");
        store.upsert(item(ts, "Toner", Some(1)));
        store.upsert(item(ts, "Toner", Some(4)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.rows()[0].rank, Some(4));
    }

    #[test]
    fn sorted_rows_put_absent_ranks_last() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let store = HistoryStore::from_rows(
            "skincare",
            vec![
                item(ts, "NoRank", None),
                item(ts, "Second", Some(2)),
                item(ts, "First", Some(1)),
            ],
        );
        let names: Vec<_> = store.sorted_rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["First", "Second", "NoRank"]);
    }

    #[test]
    fn latest_timestamp_before_is_strict() {
        let t1 = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 9, 2, 9, 0, 0).unwrap();
        let store =
            HistoryStore::from_rows("skincare", vec![item(t1, "A", Some(1)), item(t2, "A", Some(2))]);
        assert_eq!(store.latest_timestamp_before(t2), Some(t1));
        assert_eq!(store.latest_timestamp_before(t1), None);
    }
}
