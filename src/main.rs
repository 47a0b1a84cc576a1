//! Nooze Digest — Binary Entrypoint
//! One pass: fetch feeds, dedup, classify, synthesize, render, archive.
//!
//! Requires ANTHROPIC_API_KEY in the environment (or `.env`).

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nooze_digest::anthropic::AnthropicClient;
use nooze_digest::classify::AnthropicClassifier;
use nooze_digest::feeds::{FeedProvider, RssFeed};
use nooze_digest::synthesize::AnthropicSynthesizer;
use nooze_digest::{DigestConfig, Pipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nooze_digest=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = DigestConfig::load()?;

    // Credentials are a startup concern; fail before any fetching.
    let client = AnthropicClient::from_env()?;
    let classifier = AnthropicClassifier::new(client.clone(), &config.filter_model);
    let synthesizer = AnthropicSynthesizer::new(client, &config.synthesis_model);

    let providers: Vec<Box<dyn FeedProvider>> = config
        .feeds
        .iter()
        .map(|f| Box::new(RssFeed::from_url(&f.name, &f.category, &f.url)) as Box<dyn FeedProvider>)
        .collect();

    let pipeline = Pipeline::new(&config, &classifier, &synthesizer);
    let report = pipeline.run(&providers).await?;

    if report.published {
        tracing::info!(
            out_dir = %config.out_dir.display(),
            accepted = report.accepted,
            new = report.new,
            "done"
        );
    } else {
        tracing::info!(
            fetched = report.fetched,
            skipped_seen = report.skipped_seen,
            "no digest this run"
        );
    }
    Ok(())
}
