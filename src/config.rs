//! Runtime configuration
//!
//! Collects the API origin, cache location and per-endpoint TTLs from the
//! parsed command line (which itself falls back to environment variables) and
//! assembles the `ApiClient` used by every command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::{ApiClient, CachePolicy, HttpTransport, DEFAULT_API_URL};
use crate::cache::storage::origin_dir_name;
use crate::cache::{FileStorage, InvalidationBounds, MemoryStorage, Storage, TtlStore};
use crate::cli::Cli;

/// Size limit of the persistent cache, in the range browsers give local storage
pub const DEFAULT_CACHE_CAPACITY: usize = 5 * 1024 * 1024;

/// How long each kind of response may be served from cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub homepage: Duration,
    pub post_list: Duration,
    pub post: Duration,
    pub leaderboard: Duration,
    /// Categories and subjects
    pub taxonomy: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            homepage: Duration::from_secs(3 * 60),
            post_list: Duration::from_secs(2 * 60),
            post: Duration::from_secs(5 * 60),
            leaderboard: Duration::from_secs(5 * 60),
            taxonomy: Duration::from_secs(10 * 60),
        }
    }
}

/// Where cached responses live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageMode {
    /// Files under the user's cache directory, kept across runs
    #[default]
    Persistent,
    /// In memory, dropped when the process exits
    Ephemeral,
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the forum API
    pub api_url: String,
    /// Master switch for the response cache
    pub cache_enabled: bool,
    pub storage: StorageMode,
    /// Overrides the platform cache directory
    pub cache_dir: Option<PathBuf>,
    /// Byte limit of persisted entries
    pub cache_capacity: usize,
    pub ttls: CacheTtls,
    pub bounds: InvalidationBounds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_enabled: true,
            storage: StorageMode::default(),
            cache_dir: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            ttls: CacheTtls::default(),
            bounds: InvalidationBounds::default(),
        }
    }
}

impl Config {
    /// Creates a Config from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_url: cli.api_url.clone(),
            cache_enabled: !cli.no_cache,
            storage: if cli.ephemeral {
                StorageMode::Ephemeral
            } else {
                StorageMode::Persistent
            },
            cache_dir: cli.cache_dir.clone(),
            ..Self::default()
        }
    }

    /// Cache policy for a read with the given TTL, honouring the master switch
    pub fn policy(&self, ttl: Duration) -> CachePolicy {
        if self.cache_enabled {
            CachePolicy::with_ttl(ttl)
        } else {
            CachePolicy::disabled()
        }
    }

    /// Storage substrate for the configured mode
    ///
    /// Returns `None` for persistent storage when no cache directory can be
    /// determined.
    pub fn build_storage(&self) -> Option<Arc<dyn Storage>> {
        match self.storage {
            StorageMode::Ephemeral => Some(Arc::new(MemoryStorage::new())),
            StorageMode::Persistent => {
                let storage = match &self.cache_dir {
                    Some(dir) => Some(FileStorage::with_dir(dir.join(origin_dir_name(&self.api_url)))),
                    None => FileStorage::for_origin(&self.api_url),
                }?;
                info!(dir = %storage.dir().display(), "using persistent cache");
                Some(Arc::new(storage.with_capacity(self.cache_capacity)))
            }
        }
    }

    /// Assembles the API client
    ///
    /// Caching is left off when disabled or when no storage is available.
    pub fn build_client(&self) -> ApiClient<HttpTransport> {
        let transport = HttpTransport::new(self.api_url.as_str());

        let client = if !self.cache_enabled {
            ApiClient::new(transport)
        } else {
            match self.build_storage() {
                Some(storage) => ApiClient::with_cache(transport, TtlStore::new(storage)),
                None => {
                    warn!("no cache directory available, running without cache");
                    ApiClient::new(transport)
                }
            }
        };

        client.with_bounds(self.bounds.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(config.cache_enabled);
        assert_eq!(config.storage, StorageMode::Persistent);
        assert_eq!(config.ttls.homepage, Duration::from_secs(180));
        assert_eq!(config.ttls.post_list, Duration::from_secs(120));
        assert_eq!(config.ttls.post, Duration::from_secs(300));
        assert_eq!(config.ttls.leaderboard, Duration::from_secs(300));
        assert_eq!(config.bounds, InvalidationBounds::default());
    }

    #[test]
    fn test_config_from_cli_flags() {
        let cli = Cli::parse_from([
            "fiksi",
            "--api-url",
            "https://be-fiksi.onrender.com",
            "--no-cache",
            "--ephemeral",
            "homepage",
        ]);

        let config = Config::from_cli(&cli);

        assert_eq!(config.api_url, "https://be-fiksi.onrender.com");
        assert!(!config.cache_enabled);
        assert_eq!(config.storage, StorageMode::Ephemeral);
    }

    #[test]
    fn test_policy_follows_master_switch() {
        let mut config = Config::default();
        assert_eq!(
            config.policy(Duration::from_secs(60)),
            CachePolicy::with_ttl(Duration::from_secs(60))
        );

        config.cache_enabled = false;
        assert_eq!(config.policy(Duration::from_secs(60)), CachePolicy::disabled());
    }

    #[test]
    fn test_build_client_without_cache_has_no_store() {
        let config = Config {
            cache_enabled: false,
            ..Config::default()
        };

        assert!(config.build_client().store().is_none());
    }

    #[test]
    fn test_build_client_with_cache_dir_scopes_by_origin() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config {
            cache_dir: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };

        let client = config.build_client();
        client.store().expect("Cache should be enabled").set("key", &1);

        assert!(temp_dir.path().join("localhost_8000").is_dir());
    }

    #[test]
    fn test_build_client_ephemeral() {
        let config = Config {
            storage: StorageMode::Ephemeral,
            ..Config::default()
        };

        let client = config.build_client();
        let store = client.store().expect("Cache should be enabled");
        store.set("key", &1);
        assert_eq!(store.get::<i32>("key"), Some(1));
    }
}
