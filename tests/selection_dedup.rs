// tests/selection_dedup.rs
// Dedup idempotence: an identical raw item set, with the seen store updated
// between runs, yields zero accepted items on the second run.

use nooze_digest::classify::StaticClassifier;
use nooze_digest::select::SelectionEngine;
use nooze_digest::{DigestConfig, Item, Priority, SeenMap, SeenStore};

fn raw_items() -> Vec<Item> {
    (0..4)
        .map(|n| Item {
            source: "NYT".into(),
            category: "newspaper".into(),
            title: format!("Story {n}"),
            link: format!("https://nyt.test/{n}"),
            body: "body".into(),
            published_at: None,
            priority: Priority::Medium,
            reason: String::new(),
        })
        .collect()
}

#[tokio::test]
async fn second_run_on_same_snapshot_accepts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeenStore::new(dir.path().join("seen.json"), 7);
    let config = DigestConfig::default();
    let classifier = StaticClassifier::accept_all(Priority::Medium);
    let engine = SelectionEngine::new(&config, &classifier);

    let mut seen: SeenMap = store.load();
    let first = engine.select(raw_items(), &seen).await;
    assert_eq!(first.accepted.len(), 4);

    let fps: Vec<String> = raw_items().iter().map(|i| i.fingerprint()).collect();
    store.mark_seen(&mut seen, &fps);
    store.save(&seen).unwrap();

    let seen = store.load();
    let second = engine.select(raw_items(), &seen).await;
    assert_eq!(second.skipped_seen, 4);
    assert_eq!(second.surviving, 0);
    assert!(second.accepted.is_empty());
    assert!(second.buckets.is_empty());
}

#[tokio::test]
async fn body_changes_do_not_defeat_dedup() {
    let config = DigestConfig::default();
    let classifier = StaticClassifier::accept_all(Priority::Medium);
    let engine = SelectionEngine::new(&config, &classifier);

    let mut seen = SeenMap::new();
    let original = raw_items();
    for i in &original {
        seen.insert(i.fingerprint(), chrono::Utc::now());
    }

    // Same title+link, different body and timestamp: still the same item.
    let mut refetched = raw_items();
    for i in &mut refetched {
        i.body = "updated body".into();
        i.published_at = Some(chrono::Utc::now());
    }
    let out = engine.select(refetched, &seen).await;
    assert_eq!(out.skipped_seen, 4);
    assert!(out.accepted.is_empty());
}
