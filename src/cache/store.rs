//! Persistent TTL store for API responses
//!
//! Wraps a `Storage` substrate with per-entry expiry. Every entry is stored as
//! `{"data": ..., "timestamp": <epoch ms>, "ttl": <ms>}` under a key carrying
//! the `fiksi_cache_` namespace prefix. Expiry is checked lazily on read.
//!
//! The store is fail-soft: substrate or serialization failures are logged and
//! turned into a miss (reads) or a no-op (writes). Nothing here returns an
//! error to the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::storage::Storage;

/// Namespace prefix for every storage key written by the store
pub const CACHE_PREFIX: &str = "fiksi_cache_";

/// TTL used when a caller does not pick one
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Wrapper struct for cached data in storage
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data
    pub data: T,
    /// When the data was cached (Unix epoch milliseconds)
    pub timestamp: i64,
    /// How long the entry stays live, in milliseconds
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    /// Whether the entry may still be served at `now_ms`
    ///
    /// Live iff `now - timestamp <= ttl`. A timestamp in the future (the clock
    /// moved backwards) counts as live.
    pub fn is_live(&self, now_ms: i64) -> bool {
        let elapsed = now_ms.saturating_sub(self.timestamp);
        elapsed <= 0 || (elapsed as u64) <= self.ttl
    }
}

/// TTL cache over a shared storage substrate
#[derive(Debug, Clone)]
pub struct TtlStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl TtlStore {
    /// Creates a store over `storage` using wall-clock time and the default TTL
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Replaces the clock used to stamp and expire entries
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the TTL used by `set`
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// TTL used by `set`
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", CACHE_PREFIX, key)
    }

    /// Reads a live entry
    ///
    /// Returns `None` if there is no entry, the entry is not valid cache JSON,
    /// its payload does not decode as `T`, or it has expired. Expired entries
    /// are removed from storage on the way out.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let storage_key = Self::storage_key(key);

        let raw = match self.storage.get_item(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "ignoring malformed cache entry");
                return None;
            }
        };

        if !entry.is_live(self.clock.now_ms()) {
            debug!(key, "cache entry expired");
            if let Err(e) = self.storage.remove_item(&storage_key) {
                warn!(key, error = %e, "failed to remove expired cache entry");
            }
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(key, error = %e, "cached payload has an unexpected shape");
                None
            }
        }
    }

    /// Writes `data` with the default TTL
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        self.set_with_ttl(key, data, self.default_ttl);
    }

    /// Writes `data` to live for `ttl`, replacing any existing entry
    ///
    /// Serialization and storage failures (including a full substrate) are
    /// logged and otherwise ignored.
    pub fn set_with_ttl<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_ms(),
            ttl: ttl.as_millis() as u64,
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "cache write skipped: serialization failed");
                return;
            }
        };

        match self.storage.set_item(&Self::storage_key(key), &json) {
            Ok(()) => debug!(key, ttl_ms = entry.ttl, "cache populated"),
            Err(e) => warn!(key, error = %e, "cache write failed"),
        }
    }

    /// Removes the entry under `key`, whether live, expired or missing
    pub fn invalidate(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(&Self::storage_key(key)) {
            warn!(key, error = %e, "cache invalidation failed");
        }
    }

    /// Removes every entry in `keys`
    pub fn invalidate_many<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.invalidate(key.as_ref());
        }
    }

    /// Removes every namespaced entry, leaving other stored data untouched
    pub fn clear_all(&self) {
        for storage_key in self.namespaced_keys() {
            if let Err(e) = self.storage.remove_item(&storage_key) {
                warn!(key = %storage_key, error = %e, "failed to clear cache entry");
            }
        }
    }

    /// Number of namespaced entries physically present, live or not
    pub fn entry_count(&self) -> usize {
        self.namespaced_keys().len()
    }

    /// Total length of every namespaced stored value
    pub fn usage_bytes(&self) -> usize {
        self.namespaced_keys()
            .iter()
            .filter_map(|key| self.storage.get_item(key).ok().flatten())
            .map(|raw| raw.len())
            .sum()
    }

    fn namespaced_keys(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|key| key.starts_with(CACHE_PREFIX))
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to list cache entries");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::storage::{FileStorage, MemoryStorage, StorageError};
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    /// Storage whose every operation fails
    #[derive(Debug)]
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("broken".into()))
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("broken".into()))
        }
        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("broken".into()))
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            Err(StorageError::Unavailable("broken".into()))
        }
    }

    fn create_test_store() -> (TtlStore, Arc<MemoryStorage>, ManualClock) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::new(1_700_000_000_000);
        let store = TtlStore::new(storage.clone()).with_clock(Arc::new(clock.clone()));
        (store, storage, clock)
    }

    fn sample() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (store, _storage, _clock) = create_test_store();

        let result: Option<TestData> = store.get("nonexistent_key");

        assert!(result.is_none());
    }

    #[test]
    fn test_set_then_get_returns_data() {
        let (store, _storage, _clock) = create_test_store();

        store.set("key", &sample());

        assert_eq!(store.get::<TestData>("key"), Some(sample()));
    }

    #[test]
    fn test_set_writes_documented_json_shape_under_prefix() {
        let (store, storage, clock) = create_test_store();

        store.set_with_ttl("posts?page=1", &sample(), Duration::from_secs(120));

        let raw = storage
            .get_item("fiksi_cache_posts?page=1")
            .unwrap()
            .expect("Entry should be namespaced");
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["data"]["name"], "test");
        assert_eq!(json["timestamp"], clock.now_ms());
        assert_eq!(json["ttl"], 120_000);
    }

    #[test]
    fn test_entry_is_live_exactly_at_ttl() {
        let (store, _storage, clock) = create_test_store();
        store.set_with_ttl("key", &sample(), Duration::from_millis(1_000));

        clock.advance(Duration::from_millis(1_000));
        assert!(store.get::<TestData>("key").is_some(), "Boundary is inclusive");

        clock.advance(Duration::from_millis(1));
        assert!(store.get::<TestData>("key").is_none());
    }

    #[test]
    fn test_expired_entry_is_removed_from_storage() {
        let (store, storage, clock) = create_test_store();
        store.set_with_ttl("key", &sample(), Duration::from_secs(1));

        clock.advance(Duration::from_secs(2));
        assert!(store.get::<TestData>("key").is_none());

        assert!(storage.get_item("fiksi_cache_key").unwrap().is_none());
    }

    #[test]
    fn test_default_ttl_applies_to_set() {
        let (store, _storage, clock) = create_test_store();
        store.set("key", &sample());

        clock.advance(DEFAULT_TTL);
        assert!(store.get::<TestData>("key").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get::<TestData>("key").is_none());
    }

    #[test]
    fn test_future_timestamp_counts_as_live() {
        let (store, _storage, clock) = create_test_store();
        store.set_with_ttl("key", &sample(), Duration::from_secs(1));

        clock.set(clock.now_ms() - 60_000);

        assert!(store.get::<TestData>("key").is_some());
    }

    #[test]
    fn test_overwrite_refreshes_entry() {
        let (store, _storage, clock) = create_test_store();
        let updated = TestData {
            name: "second".to_string(),
            value: 2,
        };
        store.set_with_ttl("key", &sample(), Duration::from_secs(10));

        clock.advance(Duration::from_secs(8));
        store.set_with_ttl("key", &updated, Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));

        assert_eq!(store.get::<TestData>("key"), Some(updated));
    }

    #[test]
    fn test_malformed_entry_reads_as_absent_and_is_kept() {
        let (store, storage, _clock) = create_test_store();
        storage.set_item("fiksi_cache_key", "not json at all").unwrap();

        assert!(store.get::<TestData>("key").is_none());
        assert!(storage.get_item("fiksi_cache_key").unwrap().is_some());
    }

    #[test]
    fn test_payload_of_other_shape_reads_as_absent() {
        let (store, _storage, _clock) = create_test_store();
        store.set("key", &vec![1, 2, 3]);

        assert!(store.get::<TestData>("key").is_none());
        assert_eq!(store.get::<Vec<i32>>("key"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_invalidate_before_expiry() {
        let (store, _storage, _clock) = create_test_store();
        store.set("key", &sample());

        store.invalidate("key");

        assert!(store.get::<TestData>("key").is_none());
        // Missing keys are fine too
        store.invalidate("key");
    }

    #[test]
    fn test_invalidate_many() {
        let (store, _storage, _clock) = create_test_store();
        store.set("a", &1);
        store.set("b", &2);
        store.set("c", &3);

        store.invalidate_many(["a", "c"]);

        assert!(store.get::<i32>("a").is_none());
        assert_eq!(store.get::<i32>("b"), Some(2));
        assert!(store.get::<i32>("c").is_none());
    }

    #[test]
    fn test_clear_all_leaves_foreign_entries() {
        let (store, storage, _clock) = create_test_store();
        storage.set_item("access_token", "secret").unwrap();
        store.set("a", &1);
        store.set("b", &2);

        store.clear_all();

        assert_eq!(store.entry_count(), 0);
        assert_eq!(
            storage.get_item("access_token").unwrap().as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn test_usage_bytes_counts_only_namespaced_entries() {
        let (store, storage, _clock) = create_test_store();
        storage.set_item("unrelated", "0123456789").unwrap();
        store.set("a", &1);

        let raw = storage.get_item("fiksi_cache_a").unwrap().unwrap();
        assert_eq!(store.usage_bytes(), raw.len());
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_quota_exceeded_is_swallowed() {
        let storage = Arc::new(MemoryStorage::with_capacity(32));
        let store = TtlStore::new(storage.clone());

        store.set("big", &"x".repeat(100));

        assert!(store.get::<String>("big").is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_broken_storage_degrades_to_always_miss() {
        let store = TtlStore::new(Arc::new(BrokenStorage));

        store.set("key", &sample());
        store.invalidate("key");
        store.clear_all();

        assert!(store.get::<TestData>("key").is_none());
        assert_eq!(store.usage_bytes(), 0);
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_file_backed_store_survives_new_instance() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let first = TtlStore::new(Arc::new(FileStorage::with_dir(temp_dir.path().to_path_buf())));
        first.set("/posts/abc", &sample());

        let second =
            TtlStore::new(Arc::new(FileStorage::with_dir(temp_dir.path().to_path_buf())));

        assert_eq!(second.get::<TestData>("/posts/abc"), Some(sample()));
    }

    #[test]
    fn test_entry_scenario_two_minute_post_list() {
        let (store, _storage, clock) = create_test_store();
        let page = serde_json::json!({"posts": [{"id": "abc"}], "total": 42});

        store.set_with_ttl("posts?page=1&limit=10", &page, Duration::from_millis(120_000));
        assert_eq!(
            store.get::<serde_json::Value>("posts?page=1&limit=10"),
            Some(page)
        );

        clock.advance(Duration::from_millis(121_000));
        assert!(store
            .get::<serde_json::Value>("posts?page=1&limit=10")
            .is_none());
    }
}
