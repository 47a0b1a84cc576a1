// tests/pipeline_e2e.rs
// Full run against fixture feeds and stub AI capabilities, twice: the first
// run publishes, the second sees nothing new and publishes nothing.

use chrono::Utc;
use nooze_digest::classify::StaticClassifier;
use nooze_digest::config::{CategoryConfig, DigestConfig, FeedConfig};
use nooze_digest::feeds::{FeedProvider, RssFeed};
use nooze_digest::synthesize::StaticSynthesizer;
use nooze_digest::{Pipeline, Priority};

fn fixture_xml() -> String {
    let now = Utc::now().format("%a, %d %b %Y %H:%M:%S +0000");
    format!(
        r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item>
    <title>Studio announces restructuring</title>
    <link>https://example.test/restructure</link>
    <pubDate>{now}</pubDate>
    <description>Leadership changes across divisions.</description>
  </item>
  <item>
    <title>New attraction opens</title>
    <link>https://example.test/attraction</link>
    <pubDate>{now}</pubDate>
    <description>Queue already four hours long.</description>
  </item>
</channel></rss>"#
    )
}

fn test_config(dir: &std::path::Path) -> DigestConfig {
    DigestConfig {
        seen_path: dir.join("seen.json"),
        out_dir: dir.join("site"),
        categories: vec![
            CategoryConfig {
                tag: "entertainment".into(),
                label: "Entertainment Industry".into(),
                quota: 3,
                policy: "keep industry news".into(),
            },
            CategoryConfig {
                tag: "theme_parks".into(),
                label: "Theme Parks".into(),
                quota: 2,
                policy: "keep park news".into(),
            },
        ],
        feeds: vec![FeedConfig {
            name: "Fixture".into(),
            url: String::new(),
            category: "entertainment".into(),
        }],
        ..DigestConfig::default()
    }
}

#[tokio::test]
async fn two_runs_on_one_snapshot_publish_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StaticClassifier::accept_all(Priority::High);
    let synthesizer = StaticSynthesizer {
        section_text: "**Merged story**\n\nsummary\n\nhttps://example.test/restructure".into(),
        lead_text: "Unfortunately—\n* a\n* b\n* c\n* d".into(),
    };
    let pipeline = Pipeline::new(&config, &classifier, &synthesizer);

    let xml = fixture_xml();
    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(RssFeed::from_fixture(
        "Fixture",
        "entertainment",
        &xml,
    ))];

    let first = pipeline.run(&providers).await.unwrap();
    assert!(first.published);
    assert_eq!(first.fetched, 2);
    assert_eq!(first.accepted, 2);

    let md = std::fs::read_to_string(dir.path().join("site/digest.md")).unwrap();
    assert!(md.contains("Unfortunately—"));
    assert!(md.contains("## Entertainment Industry"));
    // Only the fixture's category produced a section.
    assert!(!md.contains("## Theme Parks"));
    assert!(dir.path().join("site/index.html").exists());
    assert!(dir.path().join("seen.json").exists());

    let second = pipeline.run(&providers).await.unwrap();
    assert!(!second.published);
    assert_eq!(second.fetched, 2);
    assert_eq!(second.skipped_seen, 2);
    assert_eq!(second.accepted, 0);

    // Still exactly one archived edition.
    let archived = std::fs::read_dir(dir.path().join("site/archive"))
        .unwrap()
        .flatten()
        .filter(|e| e.file_name() != "index.html")
        .count();
    assert_eq!(archived, 1);
}

#[tokio::test]
async fn rejected_items_are_marked_seen_and_not_reclassified() {
    use anyhow::Result;
    use async_trait::async_trait;
    use nooze_digest::classify::{Classifier, Verdict};
    use nooze_digest::Item;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRejector {
        calls: AtomicUsize,
    }
    #[async_trait]
    impl Classifier for CountingRejector {
        async fn classify(&self, _item: &Item, _policy: &str) -> Result<Verdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Verdict {
                include: false,
                priority: Priority::Low,
                reason: "not interesting".into(),
            })
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = CountingRejector {
        calls: AtomicUsize::new(0),
    };
    let synthesizer = StaticSynthesizer {
        section_text: String::new(),
        lead_text: String::new(),
    };
    let pipeline = Pipeline::new(&config, &classifier, &synthesizer);

    let xml = fixture_xml();
    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(RssFeed::from_fixture(
        "Fixture",
        "entertainment",
        &xml,
    ))];

    let first = pipeline.run(&providers).await.unwrap();
    assert!(!first.published);
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);

    // Everything fetched was marked seen, so nothing is classified again.
    let second = pipeline.run(&providers).await.unwrap();
    assert_eq!(second.skipped_seen, 2);
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
}
