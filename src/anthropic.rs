// src/anthropic.rs
// Thin Messages-API transport shared by the classifier and the synthesizer:
// one prompt in, one text completion out. No retries; callers own fallback.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    /// Fails fast when the key is absent; a missing credential is a startup
    /// error, not something to discover mid-run.
    pub fn new(api_key: String) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "empty Anthropic API key");
        let http = reqwest::Client::builder()
            .user_agent("nooze-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Ok(Self { http, api_key })
    }

    pub fn from_env() -> Result<Self> {
        let key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY is required (set it in the environment or .env)")?;
        Self::new(key)
    }

    pub async fn complete(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            content: Vec<Block>,
        }
        #[derive(Deserialize)]
        struct Block {
            #[serde(default)]
            text: String,
        }

        let req = Req {
            model,
            max_tokens,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&req)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = resp.status();
        anyhow::ensure!(status.is_success(), "anthropic returned {status}");

        let body: Resp = resp.json().await.context("anthropic response body")?;
        let text = body
            .content
            .first()
            .map(|b| b.text.trim().to_string())
            .unwrap_or_default();
        anyhow::ensure!(!text.is_empty(), "anthropic returned empty completion");
        Ok(text)
    }
}
