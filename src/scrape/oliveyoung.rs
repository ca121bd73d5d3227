// src/scrape/oliveyoung.rs
//! Best-list scraper for oliveyoung.co.kr. Fetching and parsing are split so
//! the parser runs against HTML fixtures in tests without any network.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{normalize_text, RankingSource, RawItem};
use crate::config::Category;
use crate::snapshot::TOP_N;

pub const BEST_LIST_URL: &str = "https://www.oliveyoung.co.kr/store/main/getBestList.do";

pub struct OliveYoungSource {
    client: reqwest::Client,
}

impl OliveYoungSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rankwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for OliveYoungSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankingSource for OliveYoungSource {
    async fn fetch_ranking(&self, category: &Category) -> Result<Vec<RawItem>> {
        let mut req = self.client.get(BEST_LIST_URL);
        if !category.id.is_empty() {
            req = req.query(&[("dispCatNo", category.id.as_str())]);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("fetching best list for {}", category.name))?;
        let html = resp
            .error_for_status()
            .with_context(|| format!("best list request for {}", category.name))?
            .text()
            .await
            .context("reading best list body")?;

        let items = parse_best_list(&html);
        debug!(category = %category.name, items = items.len(), "parsed best list");
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "oliveyoung"
    }
}

/// Extract the top-N best-list entries from a category page. Missing nodes
/// become absent fields; an item with nothing recognizable at all is skipped.
pub fn parse_best_list(html: &str) -> Vec<RawItem> {
    let doc = Html::parse_document(html);
    let items_sel = Selector::parse("ul.cate_prd_list > li").unwrap();
    let rank_sel = Selector::parse(".thumb_flag.best").unwrap();
    let brand_sel = Selector::parse(".tx_brand").unwrap();
    let name_sel = Selector::parse(".tx_name").unwrap();
    let orig_sel = Selector::parse(".tx_org .tx_num").unwrap();
    let sale_sel = Selector::parse(".tx_cur .tx_num").unwrap();

    doc.select(&items_sel)
        .take(TOP_N)
        .map(|li| RawItem {
            rank: text_of(li, &rank_sel),
            brand: text_of(li, &brand_sel),
            name: text_of(li, &name_sel),
            original_price: text_of(li, &orig_sel),
            sale_price: text_of(li, &sale_sel),
        })
        .filter(|item| *item != RawItem::default())
        .collect()
}

fn text_of(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(|node| normalize_text(&node.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}
