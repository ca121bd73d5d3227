// src/snapshot.rs
//! Data model for one scraped ranking snapshot, plus the lenient field
//! parsers. Malformed text degrades to an absent value and is never an error;
//! the row is kept for record-keeping either way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scrape::RawItem;

/// Fixed size of the best-list window per scrape.
pub const TOP_N: usize = 10;

/// Placeholder identity for items the page renders without a name.
pub const UNKNOWN_NAME: &str = "N/A";

/// Classification of an item relative to the previous recorded snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum StatusLabel {
    NEW,
    CHANGED,
    UNCHANGED,
    DROPPED,
}

/// One entry of a ranking snapshot. `(category, name)` is the identity of a
/// trend line across time; identity is by display name only, so two distinct
/// products rendering the same name are indistinguishable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub rank: Option<u32>,
    pub brand: Option<String>,
    pub name: String,
    pub original_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub discount_percent: Option<i32>,
    pub status: Option<StatusLabel>,
}

impl RankedItem {
    /// Build a record from the raw text fields a scrape returns, stamping it
    /// with the snapshot's category and timestamp.
    pub fn from_raw(raw: &RawItem, category: &str, timestamp: DateTime<Utc>) -> Self {
        let original_price = raw.original_price.as_deref().and_then(parse_price);
        let sale_price = raw.sale_price.as_deref().and_then(parse_price);
        Self {
            timestamp,
            category: category.to_string(),
            rank: raw.rank.as_deref().and_then(parse_rank),
            brand: raw.brand.clone(),
            name: raw
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            original_price,
            sale_price,
            discount_percent: discount_percent(original_price, sale_price),
            status: None,
        }
    }
}

/// Convert a scrape result into snapshot rows at one timestamp.
pub fn from_raw_items(category: &str, timestamp: DateTime<Utc>, raws: &[RawItem]) -> Vec<RankedItem> {
    raws.iter()
        .map(|r| RankedItem::from_raw(r, category, timestamp))
        .collect()
}

/// Parse a rank badge. Only positive integers count; "N/A", empty or
/// otherwise unparseable text yields an absent rank.
pub fn parse_rank(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok().filter(|r| *r > 0)
}

/// Parse a displayed price like "12,900". Thousands separators are stripped;
/// anything non-numeric yields an absent price.
pub fn parse_price(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// `round((orig - sale) / orig * 100)` when the original price is known and
/// positive; absent otherwise.
pub fn discount_percent(original: Option<f64>, sale: Option<f64>) -> Option<i32> {
    match (original, sale) {
        (Some(orig), Some(sale)) if orig > 0.0 => {
            Some(((orig - sale) / orig * 100.0).round() as i32)
        }
        _ => None,
    }
}
