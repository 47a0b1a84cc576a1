// src/feeds/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::feeds::{normalize_body, FeedProvider};
use crate::item::Item;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}
#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    // content:encoded carries the full body on WordPress-style feeds
    #[serde(rename = "content:encoded")]
    content: Option<String>,
}

fn parse_rfc2822_to_utc(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

/// One configured RSS feed, tagged with its category at construction.
pub struct RssFeed {
    name: String,
    category: String,
    mode: Mode,
}

enum Mode {
    Http { url: String, client: reqwest::Client },
    Fixture(String),
}

impl RssFeed {
    pub fn from_url(name: &str, category: &str, url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("nooze-digest/0.1")
            .connect_timeout(std::time::Duration::from_secs(4))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            name: name.to_string(),
            category: category.to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    /// Parse from a canned XML string; used by tests.
    pub fn from_fixture(name: &str, category: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items(&self, s: &str, cutoff: DateTime<Utc>) -> Result<Vec<Item>> {
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml from {}", self.name))?;

        let mut out = Vec::with_capacity(rss.channel.items.len());
        for it in rss.channel.items {
            let published_at = it.pub_date.as_deref().and_then(parse_rfc2822_to_utc);
            // Undated items pass through; only provably old ones are dropped.
            if let Some(ts) = published_at {
                if ts < cutoff {
                    continue;
                }
            }

            let body_raw = it
                .content
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .or(it.description.as_deref())
                .unwrap_or_default();

            out.push(Item {
                source: self.name.clone(),
                category: self.category.clone(),
                title: it.title.unwrap_or_else(|| "No title".to_string()),
                link: it.link.unwrap_or_default(),
                body: normalize_body(body_raw),
                published_at,
                priority: Default::default(),
                reason: String::new(),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for RssFeed {
    async fn fetch(&self, cutoff: DateTime<Utc>) -> Result<Vec<Item>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items(s, cutoff),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{} http get", self.name))?
                    .text()
                    .await
                    .with_context(|| format!("{} http body", self.name))?;
                self.parse_items(&body, cutoff)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
