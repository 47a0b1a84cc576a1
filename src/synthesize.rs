// src/synthesize.rs
// Per-category synthesis contract: a bounded same-category batch goes in,
// reader-facing entries come out, with duplicate-event coverage merged into
// single entries. Also owns the "tired observations" opener. Both calls
// degrade to deterministic local output on failure; neither can abort a run.

use anyhow::Result;
use async_trait::async_trait;

use crate::anthropic::AnthropicClient;
use crate::item::Item;

/// Representative items handed to the lead call.
pub const LEAD_SAMPLE: usize = 20;
/// Body preview length inside the lead prompt.
pub const LEAD_PREVIEW_CHARS: usize = 150;
/// Body length used by the deterministic section fallback.
pub const FALLBACK_BODY_CHARS: usize = 200;

pub const LEAD_PLACEHOLDER: &str = "Unfortunately:\n* The news happened again today.";

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Merge a same-category batch into approximately `target` entries,
    /// fewer when several items cover one event. Free text in the
    /// headline/summary/link template; conformance is the service's job.
    async fn section(&self, items: &[Item], target: usize) -> Result<String>;

    /// Exactly 4 short observations from a sample of accepted items, in the
    /// fixed "Unfortunately—" template. Tragedy is excluded by instruction,
    /// not re-validated here.
    async fn lead(&self, items: &[Item]) -> Result<String>;
}

/// Section call with the documented failure policy applied: one entry per
/// item, no merging, never an error.
pub async fn section_or_fallback(
    synth: &dyn Synthesizer,
    items: &[Item],
    target: usize,
) -> String {
    match synth.section(items, target).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = ?e, count = items.len(), "synthesis failed, using fallback rendering");
            fallback_section(items)
        }
    }
}

pub async fn lead_or_placeholder(synth: &dyn Synthesizer, items: &[Item]) -> String {
    match synth.lead(items).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = ?e, "lead synthesis failed, using placeholder");
            LEAD_PLACEHOLDER.to_string()
        }
    }
}

/// Deterministic per-item rendering: original title, truncated body, link.
pub fn fallback_section(items: &[Item]) -> String {
    items
        .iter()
        .map(|a| {
            format!(
                "**{}**\n\n{}...\n\n{}",
                a.title,
                a.excerpt(FALLBACK_BODY_CHARS),
                a.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn section_prompt(items: &[Item], target: usize) -> String {
    let articles_text = items
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "ARTICLE {}:\nOriginal headline: {}\nSource: {}\nContent: {}\nLink: {}",
                i + 1,
                a.title,
                a.source,
                a.body,
                a.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        r#"For the articles below, create a clean digest entry for each UNIQUE story.

CRITICAL: If multiple articles cover the SAME story (e.g., same event reported by several outlets), COMBINE them into ONE entry using the best details from each. Only create separate entries if articles cover genuinely different angles or breaking developments.

Target approximately {target} entries for this section (fewer if stories overlap, more if genuinely distinct).

For each unique story:
1. REWRITTEN HEADLINE: Essential context, no clickbait, standalone-readable, under 15 words.
2. ONE-PARAGRAPH SUMMARY: 2-4 sentences of key facts. Direct and informative.
3. LINK: The best/most detailed source.

Format EXACTLY like this (no labels, just spacing):

**Headline goes here in bold**

Summary paragraph goes here. Two to four sentences covering key facts.

https://link.goes.here

ARTICLES TO PROCESS:

{articles_text}"#
    )
}

pub fn lead_prompt(items: &[Item]) -> String {
    let summaries = items
        .iter()
        .take(LEAD_SAMPLE)
        .map(|a| format!("[{}] {} - {}...", a.source, a.title, a.excerpt(LEAD_PREVIEW_CHARS)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You're writing the opener for a news digest.

You're not drunk, you're just tired. You've read too much news. You're making observations, not jokes.

VIBE:
- Exhausted but still paying attention
- Sardonic without trying to land a punchline
- Each bullet should convey actual information, not just vibes
- 8-12 words per bullet, enough to know what happened
- You're noting things with a sigh, not performing

IMPORTANT: Skip deaths, tragedies, and genuinely dark stories. This section is for weary corporate absurdity, not grief. If someone died, don't feature it here.

Write EXACTLY 4 bullets. No more, no less.

Format exactly:

Unfortunately—
* [tired observation about story 1]
* [sardonic note about story 2]
* [weary take on story 3]
* [resigned observation about story 4]

TODAY'S ARTICLES:
{summaries}"#
    )
}

/// Live synthesizer over the Anthropic Messages API.
pub struct AnthropicSynthesizer {
    client: AnthropicClient,
    model: String,
}

impl AnthropicSynthesizer {
    pub fn new(client: AnthropicClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Synthesizer for AnthropicSynthesizer {
    async fn section(&self, items: &[Item], target: usize) -> Result<String> {
        self.client
            .complete(&self.model, &section_prompt(items, target), 4000)
            .await
    }

    async fn lead(&self, items: &[Item]) -> Result<String> {
        self.client
            .complete(&self.model, &lead_prompt(items), 300)
            .await
    }
}

/// Fixed-output synthesizer for tests.
pub struct StaticSynthesizer {
    pub section_text: String,
    pub lead_text: String,
}

#[async_trait]
impl Synthesizer for StaticSynthesizer {
    async fn section(&self, _items: &[Item], _target: usize) -> Result<String> {
        Ok(self.section_text.clone())
    }
    async fn lead(&self, _items: &[Item]) -> Result<String> {
        Ok(self.lead_text.clone())
    }
}
