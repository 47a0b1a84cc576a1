// src/classify.rs
// Per-item triage: category policy text in, include/priority/reason out.
// The trait is the seam; tests substitute deterministic stubs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::anthropic::AnthropicClient;
use crate::item::{Item, Priority};

/// Classifier decision for one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub include: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reason: String,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Evaluate one item against a category policy. Errors are per-item and
    /// resolved fail-open by the selection engine, never fatal.
    async fn classify(&self, item: &Item, policy: &str) -> Result<Verdict>;
}

/// Parse a verdict from model output. Tolerates a markdown code fence around
/// the JSON; anything else unparseable is a call failure.
pub fn parse_verdict(text: &str) -> Result<Verdict> {
    let trimmed = strip_code_fence(text.trim());
    serde_json::from_str(trimmed).context("malformed verdict json")
}

// The closing fence is optional: a completion clipped at max_tokens can end
// mid-block and the JSON inside is still usable.
fn strip_code_fence(s: &str) -> &str {
    static RE_FENCE: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re = RE_FENCE
        .get_or_init(|| regex::Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*(?:```)?$").unwrap());
    match re.captures(s) {
        Some(c) => c.get(1).map(|m| m.as_str()).unwrap_or(s),
        None => s,
    }
}

/// Live classifier over the Anthropic Messages API.
pub struct AnthropicClassifier {
    client: AnthropicClient,
    model: String,
}

impl AnthropicClassifier {
    pub fn new(client: AnthropicClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    fn prompt(item: &Item, policy: &str) -> String {
        format!(
            "{policy}\n\nARTICLE TO EVALUATE:\nSource: {}\nTitle: {}\nContent: {}\n\nRespond with JSON only.",
            item.source,
            item.title,
            item.body,
        )
    }
}

#[async_trait]
impl Classifier for AnthropicClassifier {
    async fn classify(&self, item: &Item, policy: &str) -> Result<Verdict> {
        let text = self
            .client
            .complete(&self.model, &Self::prompt(item, policy), 150)
            .await?;
        parse_verdict(&text)
    }
}

/// Deterministic classifier for tests and dry runs: same verdict for every
/// item.
pub struct StaticClassifier {
    pub verdict: Verdict,
}

impl StaticClassifier {
    pub fn accept_all(priority: Priority) -> Self {
        Self {
            verdict: Verdict {
                include: true,
                priority,
                reason: "static".to_string(),
            },
        }
    }
}

#[async_trait]
impl Classifier for StaticClassifier {
    async fn classify(&self, _item: &Item, _policy: &str) -> Result<Verdict> {
        Ok(self.verdict.clone())
    }
}
