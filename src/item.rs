// src/item.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Classifier priority tier. Buckets sort High-first, stable otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// One candidate article. Immutable after fetch except for the fields the
/// classifier assigns (`priority`, `reason`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub source: String,   // e.g., "Deadline", "NYT"
    pub category: String, // category tag, e.g., "entertainment"
    pub title: String,
    pub link: String,
    pub body: String, // tag-stripped, whitespace-collapsed, capped
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reason: String,
}

impl Item {
    /// Stable identity over (title, link). Body text and timestamps do not
    /// participate, so re-fetches of the same story dedup against each other.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        hasher.update(self.link.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Char-safe prefix of the body for prompts and fallback rendering.
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.body.chars().count() <= max_chars {
            self.body.clone()
        } else {
            self.body.chars().take(max_chars).collect()
        }
    }
}
