// src/runner.rs
//! Per-category scrape → merge → save → export cycle. Best effort across
//! categories: one category failing at any step is logged and skipped, the
//! remaining categories still run, and the report records what succeeded.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::merge::{merge, MergeOptions};
use crate::report;
use crate::scrape::RankingSource;
use crate::snapshot::{self, StatusLabel};
use crate::store::HistoryBackend;

#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: String,
    pub detail: String,
    pub ok: bool,
    /// Files produced for this category (history export, trend export).
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<CategoryOutcome>,
}

impl RunReport {
    pub fn produced_files(&self) -> Vec<PathBuf> {
        self.outcomes.iter().flat_map(|o| o.files.clone()).collect()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| {
                let mark = if o.ok { "ok" } else { "FAILED" };
                format!("{}: {} ({})", o.category, mark, o.detail)
            })
            .collect()
    }
}

/// Run one scrape-merge-save cycle for every configured category, in order.
/// Single writer per category; a category runs to completion before the next
/// one starts.
pub async fn run_once<S, B>(cfg: &RunConfig, source: &S, backend: &B) -> RunReport
where
    S: RankingSource + ?Sized,
    B: HistoryBackend + ?Sized,
{
    let opts = MergeOptions {
        synthesize_dropped: cfg.synthesize_dropped,
    };
    let mut outcomes = Vec::with_capacity(cfg.categories.len());

    for category in &cfg.categories {
        let failed = |detail: String| {
            warn!(category = %category.name, %detail, "category skipped");
            CategoryOutcome {
                category: category.name.clone(),
                detail,
                ok: false,
                files: Vec::new(),
            }
        };

        let raw = match source.fetch_ranking(category).await {
            Ok(r) => r,
            Err(e) => {
                outcomes.push(failed(format!("scrape failed: {e:#}")));
                continue;
            }
        };
        if raw.is_empty() {
            outcomes.push(failed("no products found".to_string()));
            continue;
        }

        let now = Utc::now();
        let incoming = snapshot::from_raw_items(&category.name, now, &raw);

        let existing = match backend.load(&category.name) {
            Ok(s) => s,
            Err(e) => {
                outcomes.push(failed(format!("history load failed: {e}")));
                continue;
            }
        };

        let outcome = match merge(&existing, &incoming, opts) {
            Ok(o) => o,
            Err(e) => {
                outcomes.push(failed(format!("merge rejected snapshot: {e}")));
                continue;
            }
        };

        if let Err(e) = backend.save(&outcome.store) {
            outcomes.push(failed(format!("history save failed: {e}")));
            continue;
        }

        let counts = |label: StatusLabel| {
            outcome
                .classifications
                .values()
                .filter(|s| **s == label)
                .count()
        };
        info!(
            category = %category.name,
            rows = outcome.store.len(),
            new = counts(StatusLabel::NEW),
            changed = counts(StatusLabel::CHANGED),
            unchanged = counts(StatusLabel::UNCHANGED),
            dropped = counts(StatusLabel::DROPPED),
            "merged snapshot"
        );

        let mut files = Vec::new();
        if let Some(p) = backend.export_path(&category.name) {
            files.push(p);
        }
        // Trend export is a reporting collaborator: its failure does not
        // undo the merge that already persisted.
        match report::write_trend_csv(&outcome.store, &cfg.report_dir) {
            Ok(p) => files.push(p),
            Err(e) => warn!(category = %category.name, "trend export failed: {e:#}"),
        }

        outcomes.push(CategoryOutcome {
            category: category.name.clone(),
            detail: format!(
                "{} items, {} rows total",
                incoming.len(),
                outcome.store.len()
            ),
            ok: true,
            files,
        });
    }

    RunReport { outcomes }
}
