// src/seen.rs
// Persistent dedup state: fingerprint -> last-seen timestamp, one JSON file.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

pub type SeenMap = HashMap<String, DateTime<Utc>>;

/// Single source of truth for "already surfaced". Read once at run start,
/// written once after classification. No locking: overlapping runs are out
/// of scope and last writer wins.
pub struct SeenStore {
    path: PathBuf,
    retention_days: i64,
}

impl SeenStore {
    pub fn new<P: Into<PathBuf>>(path: P, retention_days: i64) -> Self {
        Self {
            path: path.into(),
            retention_days,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted state. A missing or unreadable file means "no prior
    /// state", never an error. Entries older than the retention window are
    /// dropped here and stay dropped unless re-touched.
    pub fn load(&self) -> SeenMap {
        self.load_at(Utc::now())
    }

    pub fn load_at(&self, now: DateTime<Utc>) -> SeenMap {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(_) => {
                tracing::info!(path = %self.path.display(), "no seen file, starting fresh");
                return SeenMap::new();
            }
        };
        let mut map: SeenMap = match serde_json::from_str(&raw) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "corrupt seen file, starting fresh");
                return SeenMap::new();
            }
        };
        let cutoff = now - Duration::days(self.retention_days);
        let before = map.len();
        map.retain(|_, ts| *ts > cutoff);
        tracing::info!(kept = map.len(), loaded = before, "loaded seen fingerprints");
        map
    }

    /// Overwrite fingerprint -> now for every fetched item, accepted or not,
    /// so rejected items are never re-classified on a later run.
    pub fn mark_seen(&self, seen: &mut SeenMap, fingerprints: &[String]) {
        let now = Utc::now();
        for fp in fingerprints {
            seen.insert(fp.clone(), now);
        }
    }

    /// Full-file rewrite through a tmp sibling + rename so an interrupted
    /// run leaves the previous state intact. Write errors propagate: losing
    /// one run of dedup history is acceptable, silent corruption is not.
    pub fn save(&self, seen: &SeenMap) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
        }
        let json = serde_json::to_string(seen).context("serializing seen map")?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("renaming into {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("seen.json"), 7);
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        fs::write(&path, "{not json").unwrap();
        let store = SeenStore::new(&path, 7);
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("seen.json"), 7);
        let mut seen = SeenMap::new();
        store.mark_seen(&mut seen, &["abc".to_string(), "def".to_string()]);
        store.save(&seen).unwrap();
        let reloaded = store.load();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains_key("abc"));
    }

    #[test]
    fn entries_past_retention_are_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let store = SeenStore::new(&path, 7);
        let now = Utc::now();
        let mut seen = SeenMap::new();
        seen.insert("old".into(), now - Duration::days(10));
        seen.insert("fresh".into(), now - Duration::days(1));
        store.save(&seen).unwrap();

        let reloaded = store.load_at(now);
        assert!(!reloaded.contains_key("old"));
        assert!(reloaded.contains_key("fresh"));
    }

    #[test]
    fn mark_seen_overwrites_prior_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("seen.json"), 7);
        let mut seen = SeenMap::new();
        seen.insert("abc".into(), Utc::now() - Duration::days(6));
        let old = seen["abc"];
        store.mark_seen(&mut seen, &["abc".to_string()]);
        assert!(seen["abc"] > old);
    }
}
