// tests/render_archive.rs
use chrono::{TimeZone, Utc};
use nooze_digest::render::Archiver;

#[test]
fn publish_writes_primary_snapshot_and_index() {
    let dir = tempfile::tempdir().unwrap();
    let archiver = Archiver::new(dir.path());
    let at = Utc.with_ymd_and_hms(2026, 8, 28, 14, 30, 0).unwrap();

    archiver
        .publish("Iwitless Nooze", "# Iwitless Nooze\n\n**hello**", at, 2, 5)
        .unwrap();

    assert!(dir.path().join("digest.md").exists());
    let page = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(page.contains("<strong>hello</strong>"));
    assert!(page.contains("Generated from 2 filtered articles (of 5 new)"));

    let snapshot = dir.path().join("archive/20260828_1430.html");
    assert_eq!(std::fs::read_to_string(snapshot).unwrap(), page);

    let index = std::fs::read_to_string(dir.path().join("archive/index.html")).unwrap();
    assert!(index.contains(r#"<a href="20260828_1430.html">"#));
    assert!(index.contains("August 28, 2026"));
}

#[test]
fn archive_index_lists_newest_first_and_skips_itself() {
    let dir = tempfile::tempdir().unwrap();
    let archiver = Archiver::new(dir.path());
    for (d, hm) in [(26, "0900"), (28, "1430"), (27, "0700")] {
        let at = Utc
            .with_ymd_and_hms(2026, 8, d, hm[..2].parse().unwrap(), hm[2..].parse().unwrap(), 0)
            .unwrap();
        archiver.publish("T", "# T", at, 1, 1).unwrap();
    }

    let index = std::fs::read_to_string(dir.path().join("archive/index.html")).unwrap();
    let p28 = index.find("20260828_1430.html").unwrap();
    let p27 = index.find("20260827_0700.html").unwrap();
    let p26 = index.find("20260826_0900.html").unwrap();
    assert!(p28 < p27 && p27 < p26);
    assert!(!index.contains(r#"href="index.html""#));
}

#[test]
fn archive_index_caps_at_the_hundred_most_recent() {
    let dir = tempfile::tempdir().unwrap();
    let archiver = Archiver::new(dir.path());
    std::fs::create_dir_all(archiver.archive_dir()).unwrap();
    for i in 0..105 {
        let name = format!("20260101_{:02}{:02}.html", i / 60, i % 60);
        std::fs::write(archiver.archive_dir().join(name), "x").unwrap();
    }

    let count = archiver.write_archive_index().unwrap();
    assert_eq!(count, 100);

    let index = std::fs::read_to_string(dir.path().join("archive/index.html")).unwrap();
    // The five oldest editions fall off the index; the newest stays.
    assert!(!index.contains("20260101_0000.html"));
    assert!(!index.contains("20260101_0004.html"));
    assert!(index.contains("20260101_0005.html"));
    assert!(index.contains("20260101_0144.html"));
}

#[test]
fn unparseable_snapshot_names_fall_back_to_the_stem() {
    let dir = tempfile::tempdir().unwrap();
    let archiver = Archiver::new(dir.path());
    std::fs::create_dir_all(archiver.archive_dir()).unwrap();
    std::fs::write(archiver.archive_dir().join("handmade.html"), "x").unwrap();

    let count = archiver.write_archive_index().unwrap();
    assert_eq!(count, 1);
    let index = std::fs::read_to_string(dir.path().join("archive/index.html")).unwrap();
    assert!(index.contains(r#"<a href="handmade.html">handmade</a>"#));
}
