// src/select.rs
// Dedup against the seen store, classify survivors, partition by category,
// and apply soft per-category quotas with priority-aware overflow.

use std::collections::HashMap;

use crate::classify::Classifier;
use crate::config::DigestConfig;
use crate::item::{Item, Priority};
use crate::seen::SeenMap;

/// Selection output: trimmed per-category buckets plus the full accepted
/// list in classification order (feeds the lead section).
#[derive(Debug, Default)]
pub struct Selection {
    pub buckets: HashMap<String, Vec<Item>>,
    pub accepted: Vec<Item>,
    pub skipped_seen: usize,
    pub surviving: usize,
}

pub struct SelectionEngine<'a> {
    config: &'a DigestConfig,
    classifier: &'a dyn Classifier,
}

impl<'a> SelectionEngine<'a> {
    pub fn new(config: &'a DigestConfig, classifier: &'a dyn Classifier) -> Self {
        Self { config, classifier }
    }

    /// Drop items already in the seen map. Runs before any classifier call
    /// so duplicates never cost an API request.
    pub fn dedup(&self, raw: Vec<Item>, seen: &SeenMap) -> (Vec<Item>, usize) {
        let mut fresh = Vec::with_capacity(raw.len());
        let mut skipped = 0usize;
        for item in raw {
            if seen.contains_key(&item.fingerprint()) {
                skipped += 1;
            } else {
                fresh.push(item);
            }
        }
        (fresh, skipped)
    }

    pub async fn select(&self, raw: Vec<Item>, seen: &SeenMap) -> Selection {
        let (fresh, skipped_seen) = self.dedup(raw, seen);
        let surviving = fresh.len();
        tracing::info!(fresh = surviving, skipped_seen, "deduplicated fetch set");

        // Classify one at a time; errors fail open. Losing a real story is
        // worse than including a borderline one.
        let mut accepted = Vec::new();
        for mut item in fresh {
            let policy = self.config.policy_for(&item.category);
            match self.classifier.classify(&item, policy).await {
                Ok(v) if v.include => {
                    item.priority = v.priority;
                    item.reason = v.reason;
                    accepted.push(item);
                }
                Ok(v) => {
                    tracing::debug!(title = %item.title, reason = %v.reason, "excluded");
                }
                Err(e) => {
                    tracing::warn!(error = ?e, title = %item.title, "classifier error, including by default");
                    item.priority = Priority::Medium;
                    item.reason = format!("included by default after classifier error: {e}");
                    accepted.push(item);
                }
            }
        }

        // Partition into buckets, then sort and trim each.
        let mut buckets: HashMap<String, Vec<Item>> = HashMap::new();
        for item in &accepted {
            buckets
                .entry(item.category.clone())
                .or_default()
                .push(item.clone());
        }

        for (tag, bucket) in buckets.iter_mut() {
            let limit = self
                .config
                .category(tag)
                .map(|c| c.quota)
                .unwrap_or(5);
            sort_high_first(bucket);
            apply_quota(bucket, limit, self.config.overflow);
        }

        Selection {
            buckets,
            accepted,
            skipped_seen,
            surviving,
        }
    }
}

/// Stable sort: high tier first, insertion order preserved within tiers.
/// No secondary key.
fn sort_high_first(bucket: &mut [Item]) {
    bucket.sort_by_key(|i| if i.priority == Priority::High { 0 } else { 1 });
}

/// Soft quota. When high-priority items alone meet the limit, drop every
/// non-high item and allow up to `overflow` extra high ones; high items
/// beyond that ceiling are dropped too. Otherwise trim to `limit` with no
/// overflow. Expects a high-first sorted bucket.
fn apply_quota(bucket: &mut Vec<Item>, limit: usize, overflow: usize) {
    let high = bucket
        .iter()
        .filter(|i| i.priority == Priority::High)
        .count();
    if high >= limit {
        bucket.truncate(high.min(limit + overflow));
    } else if bucket.len() > limit {
        bucket.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, priority: Priority) -> Item {
        Item {
            source: "Test".into(),
            category: "entertainment".into(),
            title: title.into(),
            link: format!("https://x.test/{title}"),
            body: String::new(),
            published_at: None,
            priority,
            reason: String::new(),
        }
    }

    fn bucket(priorities: &[Priority]) -> Vec<Item> {
        priorities
            .iter()
            .enumerate()
            .map(|(i, p)| item(&format!("t{i}"), *p))
            .collect()
    }

    #[test]
    fn sort_is_stable_within_tiers() {
        use Priority::*;
        let mut b = bucket(&[Medium, High, Medium, High, Low]);
        sort_high_first(&mut b);
        let titles: Vec<_> = b.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["t1", "t3", "t0", "t2", "t4"]);
    }

    #[test]
    fn quota_fills_with_non_high_up_to_limit() {
        use Priority::*;
        let mut b = bucket(&[High, Medium, Medium, Low, Medium]);
        sort_high_first(&mut b);
        apply_quota(&mut b, 3, 2);
        assert_eq!(b.len(), 3);
        assert_eq!(b[0].priority, High);
    }

    #[test]
    fn quota_grants_overflow_only_to_all_high_buckets() {
        use Priority::*;
        // 4 high with limit 3: all kept (within limit+2), non-high dropped.
        let mut b = bucket(&[High, Medium, High, High, High, Medium]);
        sort_high_first(&mut b);
        apply_quota(&mut b, 3, 2);
        assert_eq!(b.len(), 4);
        assert!(b.iter().all(|i| i.priority == High));
    }

    #[test]
    fn quota_clips_high_beyond_ceiling() {
        use Priority::*;
        let mut b = bucket(&[High; 8]);
        sort_high_first(&mut b);
        apply_quota(&mut b, 3, 2);
        assert_eq!(b.len(), 5); // limit + overflow
        let titles: Vec<_> = b.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["t0", "t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn quota_leaves_small_buckets_alone() {
        use Priority::*;
        let mut b = bucket(&[Medium, Low]);
        sort_high_first(&mut b);
        apply_quota(&mut b, 3, 2);
        assert_eq!(b.len(), 2);
    }
}
