//! Session store for persisting resolved image URLs to disk
//!
//! Provides a `SessionStore` that writes one small JSON file per cache key,
//! namespaced by a cache-format version so that format changes leave old
//! entries unread. Entries carry an expiry timestamp; once it passes they
//! read as misses and the network lookup runs again.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Cache-format version; bumping it invalidates every stored entry
pub const CACHE_VERSION: &str = "v1";

/// Stored in place of a URL when a lookup confirmed there is no image
pub const NO_IMAGE_SENTINEL: &str = "__carimage_no_image__";

/// How long a stored entry is trusted, in hours
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 12;

/// Wrapper struct for an entry stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct SessionEntry {
    /// The image URL, or the sentinel for a confirmed absence
    value: String,
    /// When the entry was written
    cached_at: DateTime<Utc>,
    /// When the entry stops being served
    expires_at: DateTime<Utc>,
}

/// Reads and writes image resolution results on disk
///
/// Entries live in an XDG-compliant cache directory (`~/.cache/carimage/` on
/// Linux) as `<version>_<hex key>.json`. Expired entries are left on disk
/// and overwritten by the next successful write for the same key.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Directory where entry files are stored
    cache_dir: PathBuf,
    /// Namespace prefix for entry files
    version: String,
    /// Lifetime of newly written entries
    ttl_hours: u64,
}

impl SessionStore {
    /// Creates a new SessionStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "carimage")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new SessionStore with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            version: CACHE_VERSION.to_string(),
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }

    /// Overrides the namespace version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Overrides the lifetime of newly written entries
    pub fn with_ttl_hours(mut self, ttl_hours: u64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }

    /// Returns the lifetime of newly written entries, in hours
    pub fn ttl_hours(&self) -> u64 {
        self.ttl_hours
    }

    /// Returns the directory entries are written to
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the entry file for the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}_{}.json", self.version, hex::encode(key)))
    }

    /// Reads an entry
    ///
    /// # Returns
    /// * `None` if the key was never stored, the entry has expired, or the
    ///   file cannot be parsed
    /// * `Some(None)` if the key is stored as a confirmed absence
    /// * `Some(Some(url))` if the key is stored with an image URL
    pub fn read(&self, key: &str) -> Option<Option<String>> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: SessionEntry = serde_json::from_str(&content).ok()?;

        if Utc::now() > entry.expires_at {
            log::debug!("Session entry for {} expired at {}", key, entry.expires_at);
            return None;
        }

        if entry.value == NO_IMAGE_SENTINEL {
            Some(None)
        } else {
            Some(Some(entry.value))
        }
    }

    /// Writes an entry, storing the sentinel when `value` is `None`
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write(&self, key: &str, value: Option<&str>) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let now = Utc::now();
        let entry = SessionEntry {
            value: value.unwrap_or(NO_IMAGE_SENTINEL).to_string(),
            cached_at: now,
            expires_at: now + Duration::hours(self.ttl_hours as i64),
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.entry_path(key), json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    fn create_test_store() -> (SessionStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = SessionStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_write_creates_versioned_file() {
        let (store, temp_dir) = create_test_store();

        store
            .write("toyota|corolla|2020", Some("https://example.com/corolla.jpg"))
            .expect("Write should succeed");

        let expected_path = temp_dir
            .path()
            .join(format!("{}_{}.json", CACHE_VERSION, hex::encode("toyota|corolla|2020")));
        assert!(expected_path.exists(), "Entry file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("https://example.com/corolla.jpg"));
        assert!(content.contains("cached_at"));
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.read("nonexistent_key").is_none());
    }

    #[test]
    fn test_read_returns_stored_url() {
        let (store, _temp_dir) = create_test_store();

        store
            .write("listing-1", Some("https://example.com/a.jpg"))
            .expect("Write should succeed");

        assert_eq!(
            store.read("listing-1"),
            Some(Some("https://example.com/a.jpg".to_string()))
        );
    }

    #[test]
    fn test_sentinel_reads_back_as_confirmed_absence() {
        let (store, temp_dir) = create_test_store();

        store.write("listing-2", None).expect("Write should succeed");

        assert_eq!(store.read("listing-2"), Some(None));

        let path = temp_dir
            .path()
            .join(format!("{}_{}.json", CACHE_VERSION, hex::encode("listing-2")));
        let content = fs::read_to_string(path).expect("Should read file");
        assert!(content.contains(NO_IMAGE_SENTINEL));
    }

    #[test]
    fn test_other_version_is_not_visible() {
        let (store, temp_dir) = create_test_store();
        store
            .write("listing-3", Some("https://example.com/old.jpg"))
            .expect("Write should succeed");

        let bumped = SessionStore::with_dir(temp_dir.path().to_path_buf()).with_version("v2");
        assert!(bumped.read("listing-3").is_none());
        assert!(store.read("listing-3").is_some());
    }

    #[test]
    fn test_read_ignores_corrupt_entry() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.entry_path("broken"), "not json").expect("Should write file");

        assert!(store.read("broken").is_none());
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let store = SessionStore::with_dir(nested_path.clone());

        store
            .write("nested_key", Some("https://example.com/n.jpg"))
            .expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(store.read("nested_key").is_some());
    }

    #[test]
    fn test_write_fails_when_directory_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("occupied");
        fs::write(&file_path, "x").expect("Should write file");

        let store = SessionStore::with_dir(file_path);
        assert!(store.write("key", Some("https://example.com/x.jpg")).is_err());
    }

    #[test]
    fn test_overwrite_existing_entry() {
        let (store, _temp_dir) = create_test_store();

        store.write("overwrite_key", None).expect("First write should succeed");
        store
            .write("overwrite_key", Some("https://example.com/new.jpg"))
            .expect("Second write should succeed");

        assert_eq!(
            store.read("overwrite_key"),
            Some(Some("https://example.com/new.jpg".to_string()))
        );
    }

    #[test]
    fn test_keys_with_separators_do_not_collide() {
        let (store, _temp_dir) = create_test_store();

        store.write("a b", Some("https://example.com/1.jpg")).unwrap();
        store.write("a_b", Some("https://example.com/2.jpg")).unwrap();

        assert_eq!(store.read("a b"), Some(Some("https://example.com/1.jpg".to_string())));
        assert_eq!(store.read("a_b"), Some(Some("https://example.com/2.jpg".to_string())));
    }

    #[test]
    fn test_entry_file_name_is_hex_encoded_key() {
        let (store, _temp_dir) = create_test_store();
        let path = store.entry_path("ab|1");
        assert!(path.ends_with(format!("{}_61627c31.json", CACHE_VERSION)));
    }

    #[test]
    fn test_expired_entry_reads_as_miss() {
        let (store, _temp_dir) = create_test_store();
        let store = store.with_ttl_hours(0);

        // Write with 0 hour TTL - should expire immediately
        store.write("expired_key", None).expect("Write should succeed");
        thread::sleep(StdDuration::from_millis(10));

        assert!(store.read("expired_key").is_none());
    }

    #[test]
    fn test_fresh_entry_records_expiry() {
        let (store, _temp_dir) = create_test_store();
        let store = store.with_ttl_hours(1);
        store
            .write("fresh_key", Some("https://example.com/f.jpg"))
            .expect("Write should succeed");

        let content = fs::read_to_string(store.entry_path("fresh_key")).expect("Should read file");
        let entry: SessionEntry = serde_json::from_str(&content).expect("Should parse entry");
        assert_eq!(entry.expires_at - entry.cached_at, Duration::hours(1));
        assert_eq!(
            store.read("fresh_key"),
            Some(Some("https://example.com/f.jpg".to_string()))
        );
    }

    #[test]
    fn test_entry_without_expiry_is_ignored() {
        let (store, _temp_dir) = create_test_store();
        fs::write(
            store.entry_path("legacy"),
            r#"{"value": "https://example.com/l.jpg", "cached_at": "2024-01-01T00:00:00Z"}"#,
        )
        .expect("Should write file");

        assert!(store.read("legacy").is_none());
    }

    #[test]
    fn test_default_ttl() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.ttl_hours(), DEFAULT_SESSION_TTL_HOURS);
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(store) = SessionStore::new() {
            let path_str = store.cache_dir().to_string_lossy();
            assert!(
                path_str.contains("carimage"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
