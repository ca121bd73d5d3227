// src/scrape/mod.rs
pub mod oliveyoung;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Category;

/// One item as it comes off the page: text-or-absent fields only.
/// Parsing into typed fields happens in `snapshot`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub rank: Option<String>,
    pub brand: Option<String>,
    pub name: Option<String>,
    pub original_price: Option<String>,
    pub sale_price: Option<String>,
}

/// Source of ranking snapshots. Returns the page's best-list items in page
/// order, capped at the top-N window; an empty result means the page had no
/// recognizable product list.
#[async_trait]
pub trait RankingSource: Send + Sync {
    async fn fetch_ranking(&self, category: &Category) -> Result<Vec<RawItem>>;
    fn name(&self) -> &'static str;
}

/// Collapse whitespace and trim. Scraped nodes often carry layout newlines
/// and indentation around the visible text.
pub fn normalize_text(s: &str) -> String {
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}
