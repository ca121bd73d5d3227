// src/report.rs
//! Chart-ready trend export. Rendering itself is left to external tooling;
//! this module guarantees the reporting contract: every exported row has a
//! parseable rank and timestamp, grouped per product name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::HistoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub rank: u32,
}

/// One product's rank over time, oldest point first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<TrendPoint>,
}

/// Build per-name trend series from a category's history. Rows with an
/// absent rank are record-keeping only and are filtered out here.
pub fn trend_series(store: &HistoryStore) -> Vec<TrendSeries> {
    let mut by_name: BTreeMap<&str, Vec<TrendPoint>> = BTreeMap::new();
    for row in store.rows() {
        if let Some(rank) = row.rank {
            by_name.entry(row.name.as_str()).or_default().push(TrendPoint {
                timestamp: row.timestamp,
                rank,
            });
        }
    }
    by_name
        .into_iter()
        .map(|(name, mut points)| {
            points.sort_by_key(|p| p.timestamp);
            TrendSeries {
                name: name.to_string(),
                points,
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct TrendRow<'a> {
    date: DateTime<Utc>,
    name: &'a str,
    rank: u32,
}

/// Write the long-format `date,name,rank` table external chart tooling
/// consumes. Returns the path written.
pub fn write_trend_csv(store: &HistoryStore, report_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(report_dir)
        .with_context(|| format!("creating report dir {}", report_dir.display()))?;
    let path = report_dir.join(format!("{}_trend.csv", store.category()));

    let mut wtr = csv::Writer::from_path(&path)
        .with_context(|| format!("opening trend export {}", path.display()))?;
    for series in trend_series(store) {
        for point in &series.points {
            wtr.serialize(TrendRow {
                date: point.timestamp,
                name: &series.name,
                rank: point.rank,
            })
            .context("writing trend row")?;
        }
    }
    wtr.flush().context("flushing trend export")?;
    Ok(path)
}
