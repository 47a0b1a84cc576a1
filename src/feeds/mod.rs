// src/feeds/mod.rs
pub mod rss;

pub use rss::RssFeed;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::item::Item;

/// Body text cap; keeps classifier prompts cheap.
pub const BODY_MAX_CHARS: usize = 500;

/// One syndicated source. Recency filtering is the provider's job: items at
/// or older than `cutoff` never reach the selection stage.
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch(&self, cutoff: DateTime<Utc>) -> Result<Vec<Item>>;
    fn name(&self) -> &str;
}

/// Normalize feed body text: decode entities, strip tags, collapse
/// whitespace, cap length.
pub fn normalize_body(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    out = out.split_whitespace().collect::<Vec<_>>().join(" ");

    if out.chars().count() > BODY_MAX_CHARS {
        out = out.chars().take(BODY_MAX_CHARS).collect();
    }
    out
}

/// Fetch every provider once, isolating per-source failures: a broken feed
/// is logged and skipped, the run continues with the rest.
pub async fn fetch_all(
    providers: &[Box<dyn FeedProvider>],
    cutoff: DateTime<Utc>,
) -> Vec<Item> {
    let mut raw = Vec::new();
    for p in providers {
        match p.fetch(cutoff).await {
            Ok(mut items) => {
                tracing::info!(source = p.name(), count = items.len(), "fetched feed");
                raw.append(&mut items);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = p.name(), "feed error, skipping source");
            }
        }
    }
    raw
}
