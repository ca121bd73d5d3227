// tests/merge_dedup.rs
use chrono::{DateTime, TimeZone, Utc};
use rankwatch::merge::{merge, MergeOptions};
use rankwatch::snapshot::RankedItem;
use rankwatch::store::HistoryStore;

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

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, d, 9, 0, 0).unwrap()
}

#[test]
fn same_key_merged_twice_keeps_latest_rank() {
    let store = HistoryStore::new("skincare");
    let out1 = merge(&store, &[item(day(1), "Toner", Some(2))], MergeOptions::default()).unwrap();
    let out2 = merge(
        &out1.store,
        &[item(day(1), "Toner", Some(5))],
        MergeOptions::default(),
    )
    .unwrap();

    assert_eq!(out2.store.len(), 1);
    assert_eq!(out2.store.rows()[0].rank, Some(5));
}

#[test]
fn remerging_an_already_merged_snapshot_is_a_noop() {
    let opts = MergeOptions {
        synthesize_dropped: true,
    };
    let store = HistoryStore::from_rows(
        "skincare",
        vec![item(day(1), "A", Some(1)), item(day(1), "B", Some(2))],
    );
    let incoming = vec![item(day(2), "A", Some(3))];

    let once = merge(&store, &incoming, opts).unwrap();
    let twice = merge(&once.store, &incoming, opts).unwrap();

    assert_eq!(once.store, twice.store);
    assert_eq!(once.classifications, twice.classifications);
}

#[test]
fn dedup_groups_by_timestamp_and_name() {
    // Same name at a different timestamp is a distinct key.
    let store = HistoryStore::new("skincare");
    let out1 = merge(&store, &[item(day(1), "Toner", Some(1))], MergeOptions::default()).unwrap();
    let out2 = merge(
        &out1.store,
        &[item(day(2), "Toner", Some(1))],
        MergeOptions::default(),
    )
    .unwrap();
    assert_eq!(out2.store.len(), 2);
}
