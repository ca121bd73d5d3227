// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod merge;
pub mod notify;
pub mod report;
pub mod runner;
pub mod scrape;
pub mod snapshot;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::merge::{merge, InvalidSnapshot, MergeOptions, MergeOutcome};
pub use crate::snapshot::{RankedItem, StatusLabel, TOP_N};
pub use crate::store::{CsvBackend, HistoryBackend, HistoryStore, StoreError};
