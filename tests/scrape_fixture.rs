// tests/scrape_fixture.rs
use chrono::{TimeZone, Utc};
use rankwatch::scrape::oliveyoung::parse_best_list;
use rankwatch::snapshot::{self, TOP_N};

const FIXTURE: &str = include_str!("fixtures/bestlist.html");

#[test]
fn parses_at_most_top_n_items_in_page_order() {
    let items = parse_best_list(FIXTURE);
    // Fixture carries 11 list entries; the window is fixed at 10.
    assert_eq!(items.len(), TOP_N);
    assert_eq!(items[0].rank.as_deref(), Some("1"));
    assert_eq!(items[9].rank.as_deref(), Some("10"));
}

#[test]
fn layout_whitespace_is_normalized_out_of_names() {
    let items = parse_best_list(FIXTURE);
    assert_eq!(items[0].brand.as_deref(), Some("라운드랩"));
    assert_eq!(items[0].name.as_deref(), Some("라운드랩 1025 독도 토너 500ml"));
}

#[test]
fn missing_nodes_become_absent_fields() {
    let items = parse_best_list(FIXTURE);
    // Third entry has no rank badge and no original price.
    assert_eq!(items[2].rank, None);
    assert_eq!(items[2].original_price, None);
    assert_eq!(items[2].sale_price.as_deref(), Some("19,600"));
    // Fifth entry has no brand.
    assert_eq!(items[4].brand, None);
}

#[test]
fn snapshot_built_from_fixture_parses_numbers_leniently() {
    let ts = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
    let rows = snapshot::from_raw_items("스킨케어", ts, &parse_best_list(FIXTURE));
    assert_eq!(rows.len(), TOP_N);

    // First row: full schema, discount from comma-separated prices.
    assert_eq!(rows[0].rank, Some(1));
    assert_eq!(rows[0].original_price, Some(22000.0));
    assert_eq!(rows[0].sale_price, Some(15400.0));
    assert_eq!(rows[0].discount_percent, Some(30));

    // "N/A" original price degrades to absent, so no discount either.
    assert_eq!(rows[3].original_price, None);
    assert_eq!(rows[3].discount_percent, None);
    assert_eq!(rows[3].sale_price, Some(12900.0));

    // Missing rank badge: row kept with absent rank.
    assert_eq!(rows[2].rank, None);
    assert_eq!(rows[2].name, "아누아 어성초 77 수딩 토너 250ml");

    assert!(rows.iter().all(|r| r.category == "스킨케어" && r.timestamp == ts));
}

#[test]
fn page_without_product_list_yields_no_items() {
    let items = parse_best_list("<html><body><p>점검 중입니다</p></body></html>");
    assert!(items.is_empty());
}
