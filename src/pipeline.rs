// src/pipeline.rs
// One run, sequential: fetch -> dedup/classify/select -> mark seen ->
// synthesize per category -> assemble -> publish. The seen file is read once
// at start and written once after all classification attempts complete.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Duration, Utc};

use crate::assemble::{assemble, Digest};
use crate::classify::Classifier;
use crate::config::DigestConfig;
use crate::feeds::{fetch_all, FeedProvider};
use crate::render::Archiver;
use crate::seen::SeenStore;
use crate::select::SelectionEngine;
use crate::synthesize::{lead_or_placeholder, section_or_fallback, Synthesizer};

#[derive(Debug, Default)]
pub struct RunReport {
    pub fetched: usize,
    pub skipped_seen: usize,
    pub new: usize,
    pub accepted: usize,
    /// False when the run ended early with nothing new or nothing accepted.
    pub published: bool,
}

pub struct Pipeline<'a> {
    config: &'a DigestConfig,
    classifier: &'a dyn Classifier,
    synthesizer: &'a dyn Synthesizer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a DigestConfig,
        classifier: &'a dyn Classifier,
        synthesizer: &'a dyn Synthesizer,
    ) -> Self {
        Self {
            config,
            classifier,
            synthesizer,
        }
    }

    pub async fn run(&self, providers: &[Box<dyn FeedProvider>]) -> Result<RunReport> {
        let store = SeenStore::new(&self.config.seen_path, self.config.retention_days);
        let mut seen = store.load();

        let cutoff = Utc::now() - Duration::hours(self.config.max_age_hours);
        let raw = fetch_all(providers, cutoff).await;
        let fetched = raw.len();
        let all_fingerprints: Vec<String> = raw.iter().map(|i| i.fingerprint()).collect();

        let engine = SelectionEngine::new(self.config, self.classifier);
        let selection = engine.select(raw, &seen).await;

        // Mark the full fetched set, accepted or not, so rejected items are
        // never re-classified on a later run.
        store.mark_seen(&mut seen, &all_fingerprints);
        store.save(&seen)?;

        let mut report = RunReport {
            fetched,
            skipped_seen: selection.skipped_seen,
            new: selection.surviving,
            accepted: selection.accepted.len(),
            published: false,
        };

        if selection.surviving == 0 {
            tracing::info!("no new articles, caught up");
            return Ok(report);
        }
        if selection.accepted.is_empty() {
            tracing::info!("nothing passed filters, slow news day");
            return Ok(report);
        }

        let lead = lead_or_placeholder(self.synthesizer, &selection.accepted).await;

        // One synthesis call per non-empty category; sections degrade
        // independently, a failed batch never withholds the digest.
        let mut bodies: HashMap<String, String> = HashMap::new();
        for cat in &self.config.categories {
            let Some(items) = selection.buckets.get(&cat.tag) else {
                continue;
            };
            if items.is_empty() {
                continue;
            }
            tracing::info!(category = %cat.label, count = items.len(), "synthesizing section");
            let body = section_or_fallback(self.synthesizer, items, cat.quota).await;
            bodies.insert(cat.tag.clone(), body);
        }

        let digest: Digest = assemble(
            self.config,
            lead,
            bodies,
            selection.accepted.len(),
            selection.surviving,
        );
        let markdown = digest.to_markdown(&self.config.title);

        let archiver = Archiver::new(&self.config.out_dir);
        archiver.publish(
            &self.config.title,
            &markdown,
            digest.generated_at,
            digest.accepted_count,
            digest.new_count,
        )?;

        report.published = true;
        tracing::info!(
            accepted = report.accepted,
            new = report.new,
            "digest published"
        );
        Ok(report)
    }
}
