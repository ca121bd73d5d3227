// src/merge.rs
//! Incremental ranking-snapshot merge.
//!
//! Takes the snapshot just scraped for a category and folds it into that
//! category's history, classifying every item as NEW / CHANGED / UNCHANGED
//! against the immediately preceding recorded timestamp and (optionally)
//! synthesizing DROPPED rows for items that fell out of the top-N. The merge
//! is pure: it never touches the input store, so a failed validation leaves
//! the caller's state untouched.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::snapshot::{RankedItem, StatusLabel};
use crate::store::HistoryStore;

/// Precondition violations on the incoming snapshot. Field-level garbage is
/// not an error (it degrades to absent values upstream); these are the
/// structural problems the engine refuses to merge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSnapshot {
    #[error("snapshot is empty")]
    Empty,
    #[error("snapshot mixes timestamps {0} and {1}")]
    MixedTimestamps(DateTime<Utc>, DateTime<Utc>),
    #[error("snapshot mixes categories {0:?} and {1:?}")]
    MixedCategories(String, String),
    #[error("snapshot category {snapshot:?} does not match store category {store:?}")]
    CategoryMismatch { snapshot: String, store: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// When an item present at the previous timestamp is missing from the
    /// incoming snapshot, record a synthetic DROPPED row at the incoming
    /// timestamp so the drop stays visible in later queries.
    pub synthesize_dropped: bool,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub store: HistoryStore,
    /// Per-name classification for this round, including synthesized drops.
    pub classifications: BTreeMap<String, StatusLabel>,
}

/// Merge `incoming` (one scrape of one category at one timestamp, pre-ranked
/// by the caller) into `existing`.
///
/// Classification compares each incoming name against the rows recorded at
/// the latest timestamp strictly before the incoming one. Rows that were
/// themselves synthesized as DROPPED model absence and are not part of that
/// comparison baseline, so a returning item classifies as NEW rather than
/// chaining drops forward.
pub fn merge(
    existing: &HistoryStore,
    incoming: &[RankedItem],
    opts: MergeOptions,
) -> Result<MergeOutcome, InvalidSnapshot> {
    let first = incoming.first().ok_or(InvalidSnapshot::Empty)?;
    let ts = first.timestamp;
    let category = first.category.as_str();

    for item in incoming {
        if item.timestamp != ts {
            return Err(InvalidSnapshot::MixedTimestamps(ts, item.timestamp));
        }
        if item.category != category {
            return Err(InvalidSnapshot::MixedCategories(
                category.to_string(),
                item.category.clone(),
            ));
        }
    }
    if !existing.is_empty() && existing.category() != category {
        return Err(InvalidSnapshot::CategoryMismatch {
            snapshot: category.to_string(),
            store: existing.category().to_string(),
        });
    }

    // Baseline: rows at the previous distinct timestamp, minus synthetic
    // drops. Empty baseline (first scrape, or nothing earlier than the
    // incoming timestamp) classifies everything NEW.
    let prev_ts = existing.latest_timestamp_before(ts);
    let baseline: Vec<&RankedItem> = match prev_ts {
        Some(p) => existing
            .rows_at(p)
            .filter(|r| r.status != Some(StatusLabel::DROPPED))
            .collect(),
        None => Vec::new(),
    };
    let baseline_by_name: BTreeMap<&str, &RankedItem> =
        baseline.iter().map(|r| (r.name.as_str(), *r)).collect();

    let mut classifications = BTreeMap::new();
    let mut round: Vec<RankedItem> = Vec::with_capacity(incoming.len());

    for item in incoming {
        let label = match baseline_by_name.get(item.name.as_str()) {
            None => StatusLabel::NEW,
            Some(prev) => match (prev.rank, item.rank) {
                (Some(a), Some(b)) if a == b => StatusLabel::UNCHANGED,
                (Some(_), Some(_)) => StatusLabel::CHANGED,
                // Rank unparseable on both sides: same name persisting is
                // all the signal there is.
                (None, None) => StatusLabel::UNCHANGED,
                // Rank appeared or disappeared; no rank comparison possible.
                _ => StatusLabel::NEW,
            },
        };
        classifications.insert(item.name.clone(), label);
        let mut row = item.clone();
        row.status = Some(label);
        round.push(row);
    }

    if opts.synthesize_dropped {
        let incoming_names: HashSet<&str> = incoming.iter().map(|i| i.name.as_str()).collect();
        for prev in &baseline {
            if incoming_names.contains(prev.name.as_str()) {
                continue;
            }
            let mut dropped = (*prev).clone();
            dropped.timestamp = ts;
            dropped.status = Some(StatusLabel::DROPPED);
            classifications.insert(dropped.name.clone(), StatusLabel::DROPPED);
            round.push(dropped);
        }
    }

    let mut store = existing.clone();
    for row in round {
        store.upsert(row);
    }

    Ok(MergeOutcome {
        store,
        classifications,
    })
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
    fn first_merge_into_empty_store_is_all_new() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let incoming = vec![item(ts, "A", Some(1)), item(ts, "B", Some(2))];
        let out = merge(&HistoryStore::new("skincare"), &incoming, MergeOptions::default()).unwrap();
        assert_eq!(out.store.len(), 2);
        assert!(out
            .classifications
            .values()
            .all(|s| *s == StatusLabel::NEW));
    }

    #[test]
    fn absent_rank_on_one_side_classifies_new() {
        let t1 = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 9, 2, 9, 0, 0).unwrap();
        let store = HistoryStore::from_rows(
            "skincare",
            vec![item(t1, "A", Some(1)), item(t1, "B", None)],
        );
        let incoming = vec![item(t2, "A", None), item(t2, "B", None)];
        let out = merge(&store, &incoming, MergeOptions::default()).unwrap();
        assert_eq!(out.classifications["A"], StatusLabel::NEW);
        assert_eq!(out.classifications["B"], StatusLabel::UNCHANGED);
    }

    #[test]
    fn dropped_rows_do_not_chain_across_rounds() {
        let t1 = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 9, 2, 9, 0, 0).unwrap();
        let t3 = Utc.with_ymd_and_hms(2025, 9, 3, 9, 0, 0).unwrap();
        let opts = MergeOptions {
            synthesize_dropped: true,
        };

        let store = HistoryStore::from_rows(
            "skincare",
            vec![item(t1, "A", Some(1)), item(t1, "B", Some(2))],
        );
        let out = merge(&store, &[item(t2, "A", Some(1))], opts).unwrap();
        assert_eq!(out.classifications["B"], StatusLabel::DROPPED);

        // Next round: B is still absent, but its drop was already recorded.
        let out2 = merge(&out.store, &[item(t3, "A", Some(1))], opts).unwrap();
        assert!(!out2.classifications.contains_key("B"));
        assert_eq!(
            out2.store
                .rows()
                .iter()
                .filter(|r| r.name == "B" && r.status == Some(StatusLabel::DROPPED))
                .count(),
            1
        );
    }
}
