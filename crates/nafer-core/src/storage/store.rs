use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::feed::FeedRecord;
use crate::{Error, Result};

/// The feed store: feed name to record, persisted as one pretty-printed JSON object.
///
/// Loaded once at the start of a run and saved once at the end. Feeds keep the
/// order they have in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedStore {
    feeds: IndexMap<String, FeedRecord>,
}

impl FeedStore {
    /// Read the store from disk.
    ///
    /// A missing, unreadable or malformed file is an [`Error::StoreLoad`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::StoreLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let store: FeedStore = serde_json::from_str(&content).map_err(|e| Error::StoreLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), feeds = store.len(), "Loaded feed store");
        Ok(store)
    }

    /// Overwrite the file at `path` with the whole store
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');

        std::fs::write(path, content).map_err(|source| Error::StoreSave {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), feeds = self.len(), "Saved feed store");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FeedRecord> {
        self.feeds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.feeds.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeedRecord)> {
        self.feeds.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut FeedRecord)> {
        self.feeds.iter_mut().map(|(name, record)| (name.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}

impl FromIterator<(String, FeedRecord)> for FeedStore {
    fn from_iter<I: IntoIterator<Item = (String, FeedRecord)>>(iter: I) -> Self {
        Self {
            feeds: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const STORE: &str = r#"{
  "lwn": {
    "url": "https://lwn.net/headlines/rss",
    "etag": "\"5f3a\"",
    "modified": "Wed, 21 Oct 2015 07:28:00 GMT",
    "last_status": 304,
    "last_checked": "Thu, 22 Oct 2015 08:00:00 GMT",
    "comment": "weekly edition",
    "priority": 3
  },
  "old-blog": {
    "last_status": 410
  }
}"#;

    fn write_store(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nafer.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_reads_records() {
        let (_dir, path) = write_store(STORE);
        let store = FeedStore::load(&path).unwrap();

        assert_eq!(store.len(), 2);
        let lwn = store.get("lwn").unwrap();
        assert_eq!(lwn.url.as_deref(), Some("https://lwn.net/headlines/rss"));
        assert_eq!(lwn.last_status, Some(304));
        assert_eq!(lwn.extra.get("priority"), Some(&Value::from(3)));
        assert!(store.get("old-blog").unwrap().url.is_none());
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let (_dir, path) = write_store(STORE);
        let store = FeedStore::load(&path).unwrap();
        store.save(&path).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let original: Value = serde_json::from_str(STORE).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nafer.json");
        let store: FeedStore = [("a".to_string(), FeedRecord::with_url("http://x"))]
            .into_iter()
            .collect();

        store.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"a\": {\n    \"url\": \"http://x\"\n  }\n}\n");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        match FeedStore::load(&dir.path().join("absent")) {
            Err(Error::StoreLoad { .. }) => {}
            other => panic!("Expected StoreLoad error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        for content in ["{ not json", "[1, 2, 3]", r#"{"a": "not a record"}"#] {
            let (_dir, path) = write_store(content);
            assert!(
                matches!(FeedStore::load(&path), Err(Error::StoreLoad { .. })),
                "{content} should not load"
            );
        }
    }

    #[test]
    fn test_save_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("nafer.json");

        let err = FeedStore::default().save(&path).unwrap_err();
        assert!(matches!(err, Error::StoreSave { .. }));
    }

    #[test]
    fn test_save_keeps_file_order() {
        let (_dir, path) = write_store(
            r#"{"zeta": {"url": "http://z", "note": 1, "a_note": 2}, "alpha": {"url": "http://a"}}"#,
        );

        let store = FeedStore::load(&path).unwrap();
        store.save(&path).unwrap();

        let names: Vec<&str> = store.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.find("\"zeta\"").unwrap() < written.find("\"alpha\"").unwrap());
        assert!(written.find("\"note\"").unwrap() < written.find("\"a_note\"").unwrap());
    }
}
