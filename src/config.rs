// src/config.rs
// Immutable run configuration: feeds, category policies/quotas, knobs, paths.
// Passed by reference into the selection engine and the assembler so tests
// can run with synthetic policy tables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ENV_PATH: &str = "DIGEST_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/digest.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Stable tag items carry, e.g. "entertainment".
    pub tag: String,
    /// Display label for the digest section.
    pub label: String,
    /// Soft per-category cap; see `overflow` on `DigestConfig`.
    pub quota: usize,
    /// Policy text handed to the classifier verbatim.
    pub policy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Items older than this never reach selection.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
    /// How long fingerprints stay in the seen store without being re-touched.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Extra slots granted on high-news-volume days when high-priority items
    /// alone meet a category's quota.
    #[serde(default = "default_overflow")]
    pub overflow: usize,
    #[serde(default = "default_seen_path")]
    pub seen_path: PathBuf,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Cheap/fast model for per-item triage.
    #[serde(default = "default_filter_model")]
    pub filter_model: String,
    /// Stronger model for section synthesis and the opener.
    #[serde(default = "default_synthesis_model")]
    pub synthesis_model: String,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
    /// Declaration order is section order: news-like categories first.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            max_age_hours: default_max_age_hours(),
            retention_days: default_retention_days(),
            overflow: default_overflow(),
            seen_path: default_seen_path(),
            out_dir: default_out_dir(),
            filter_model: default_filter_model(),
            synthesis_model: default_synthesis_model(),
            feeds: default_feeds(),
            categories: default_categories(),
        }
    }
}

impl DigestConfig {
    /// Resolution ladder: $DIGEST_CONFIG_PATH, then config/digest.toml,
    /// then the embedded defaults.
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            return Self::from_path(&pb);
        }
        let default = PathBuf::from(DEFAULT_PATH);
        if default.exists() {
            return Self::from_path(&default);
        }
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config from {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.categories.is_empty(), "config has no categories");
        anyhow::ensure!(self.retention_days > 0, "retention_days must be positive");
        anyhow::ensure!(self.max_age_hours > 0, "max_age_hours must be positive");
        for c in &self.categories {
            anyhow::ensure!(c.quota > 0, "category {} has zero quota", c.tag);
        }
        Ok(())
    }

    pub fn category(&self, tag: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.tag == tag)
    }

    /// Policy for an item's tag; unknown tags borrow the first configured
    /// category's policy rather than failing the run.
    pub fn policy_for(&self, tag: &str) -> &str {
        self.category(tag)
            .or_else(|| self.categories.first())
            .map(|c| c.policy.as_str())
            .unwrap_or("")
    }
}

fn default_title() -> String {
    "Iwitless Nooze".to_string()
}
fn default_max_age_hours() -> i64 {
    24
}
fn default_retention_days() -> i64 {
    7
}
fn default_overflow() -> usize {
    2
}
fn default_seen_path() -> PathBuf {
    PathBuf::from("seen_articles.json")
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("site")
}
fn default_filter_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}
fn default_synthesis_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_feeds() -> Vec<FeedConfig> {
    let feed = |name: &str, url: &str, category: &str| FeedConfig {
        name: name.to_string(),
        url: url.to_string(),
        category: category.to_string(),
    };
    vec![
        feed("Deadline", "https://deadline.com/feed/", "entertainment"),
        feed(
            "Deadline Legal",
            "https://deadline.com/category/legal/feed",
            "entertainment",
        ),
        feed("Variety", "https://variety.com/feed/", "entertainment"),
        feed(
            "Hollywood Reporter",
            "https://www.hollywoodreporter.com/feed/",
            "entertainment",
        ),
        feed(
            "NYT",
            "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml",
            "newspaper",
        ),
        feed("LA Times", "https://www.latimes.com/news/rss2.0.xml", "newspaper"),
        feed("The Atlantic", "https://www.theatlantic.com/feed/all/", "newspaper"),
        feed(
            "The Economist",
            "https://www.economist.com/finance-and-economics/rss.xml",
            "newspaper",
        ),
        feed(
            "Artificial Lawyer",
            "https://www.artificiallawyer.com/feed/",
            "ai_legal",
        ),
        feed("WDWNT", "https://wdwnt.com/feed/", "theme_parks"),
        feed(
            "Touring Plans",
            "https://touringplans.com/blog/feed/",
            "theme_parks",
        ),
        feed("Eater LA", "https://la.eater.com/rss/index.xml", "food"),
        feed("LA Times Food", "https://www.latimes.com/food/rss2.0.xml", "food"),
    ]
}

fn default_categories() -> Vec<CategoryConfig> {
    let cat = |tag: &str, label: &str, quota: usize, policy: &str| CategoryConfig {
        tag: tag.to_string(),
        label: label.to_string(),
        quota,
        policy: policy.to_string(),
    };
    vec![
        cat("newspaper", "News", 12, POLICY_NEWSPAPER),
        cat("entertainment", "Entertainment Industry", 3, POLICY_ENTERTAINMENT),
        cat("ai_legal", "AI & Legal Tech", 3, POLICY_AI_LEGAL),
        cat("theme_parks", "Theme Parks", 2, POLICY_THEME_PARKS),
        cat("food", "LA Food Scene", 3, POLICY_FOOD),
    ]
}

const POLICY_ENTERTAINMENT: &str = r#"You are filtering entertainment industry news for a VP of Legal Affairs at a major studio who also enjoys some good industry gossip.

INCLUDE (high priority):
- M&A activity, studio acquisitions, company restructuring
- Studio/streaming leadership changes
- Streaming distribution deals and international co-productions
- Labor negotiations (WGA, SAG-AFTRA, DGA, IATSE)
- Legal disputes, lawsuits, arbitration outcomes
- Regulatory/antitrust news affecting entertainment

INCLUDE (medium priority):
- Major financing deals and international market developments
- Technology deals affecting content distribution
- Juicy actor/celebrity drama, feuds, or controversies (the good stuff)
- Industry figures saying something wild or revealing
- Deaths of notable industry figures

EXCLUDE:
- Routine casting announcements (unless A-list or surprising)
- Generic reviews, box office numbers (unless record-breaking)
- Awards show fashion, release date announcements, puff piece interviews

For each article, respond with JSON:
{"include": true/false, "priority": "high"/"medium"/"low", "reason": "brief explanation"}"#;

const POLICY_NEWSPAPER: &str = r#"You are filtering general news for an entertainment industry executive in Los Angeles.

INCLUDE (high priority):
- Entertainment industry business news
- AI/tech policy and regulation
- Antitrust actions affecting media/tech
- California legislation affecting entertainment or tech
- Major corporate news about media companies

INCLUDE (medium priority):
- Significant national political developments
- Tech industry major moves
- Los Angeles local news of significance

EXCLUDE:
- Sports (unless business angle), lifestyle/travel, weather
- Opinion pieces (unless highly relevant)
- Most crime stories and celebrity profiles

For each article, respond with JSON:
{"include": true/false, "priority": "high"/"medium"/"low", "reason": "brief explanation"}"#;

const POLICY_AI_LEGAL: &str = r#"You are filtering AI/legal tech news for an entertainment lawyer interested in AI applications.

INCLUDE (high priority):
- AI legislation and regulation
- Copyright lawsuits involving AI
- AI in entertainment industry applications
- Contract automation and legal tech affecting deal-making

INCLUDE (medium priority):
- General AI policy developments
- Law firm AI adoption news
- AI ethics in legal context

EXCLUDE:
- Consumer AI product launches (unless legally significant)
- Technical AI research (unless policy implications)
- Generic "AI will change everything" pieces

For each article, respond with JSON:
{"include": true/false, "priority": "high"/"medium"/"low", "reason": "brief explanation"}"#;

const POLICY_THEME_PARKS: &str = r#"You are filtering theme park news for someone interested in industry business and strategy.

INCLUDE (high priority):
- Corporate strategy, capacity/expansion announcements
- Competitive moves between Disney/Universal/others
- Financial results, leadership changes
- Major new attraction openings

INCLUDE (medium priority):
- Construction updates on major projects
- Pricing and operational changes

EXCLUDE:
- Food reviews, trip reports, merchandise
- Character meet-and-greets, seasonal decoration coverage
- "Tips and tricks" content

For each article, respond with JSON:
{"include": true/false, "priority": "high"/"medium"/"low", "reason": "brief explanation"}"#;

const POLICY_FOOD: &str = r#"You are filtering LA food and restaurant news. Be VERY permissive - this reader wants most food content.

INCLUDE (high priority):
- New restaurant openings and closings in LA
- Chef news and moves
- Food scene trends

INCLUDE (medium priority):
- Reviews of interesting places, food events, dining guides
- Bars WITH notable food programs
- Pretty much everything food-related in LA

EXCLUDE:
- Recipe-only content with no restaurant/scene angle
- National chain news (unless LA-specific)
- Bar news where the bar doesn't have food

For each article, respond with JSON:
{"include": true/false, "priority": "high"/"medium"/"low", "reason": "brief explanation"}"#;
