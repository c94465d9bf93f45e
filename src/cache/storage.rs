//! Storage substrate for the response cache
//!
//! A small synchronous string key-value interface in the shape of browser
//! local storage, with two implementations: `FileStorage`, which persists one
//! JSON file per key in an origin-scoped cache directory, and `MemoryStorage`,
//! which keeps everything in process. Both may reject writes once an optional
//! byte capacity is reached.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use directories::ProjectDirs;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Extension used for every file written by `FileStorage`
const FILE_EXTENSION: &str = "json";

/// Longest encoded key used directly as a file stem
///
/// Keeps names under the common 255-byte file name limit.
const MAX_ENCODED_STEM_LEN: usize = 200;

/// Leads the stem of a hashed file name; not in the URL-safe base64 alphabet
const HASHED_STEM_MARKER: char = '~';

/// Errors raised by a storage substrate
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem read/write failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The write would exceed the substrate's capacity
    #[error("Storage quota exceeded: {needed} bytes needed, capacity is {capacity} bytes")]
    QuotaExceeded { needed: usize, capacity: usize },

    /// The substrate cannot be used at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous, enumerable string key-value store
///
/// Implementations are shared by every caller in the process, so they must
/// be safe to use from several tasks at once.
pub trait Storage: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`, or `None` if there is none
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`; removing a missing key succeeds
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently stored
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Persists entries as JSON files in a per-origin cache directory
///
/// On Linux the default location is `~/.cache/fiksi/<origin>/`. File names are
/// the URL-safe base64 encoding of the key so that any key maps to a valid
/// file name and can be recovered when enumerating. Keys too long for that
/// are stored under `~<sha256 hex>.json` instead, with the encoded key on the
/// first line of the file ahead of the value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory where entry files are stored
    dir: PathBuf,
    /// Maximum total size of all entry files, in bytes
    capacity: Option<usize>,
}

impl FileStorage {
    /// Creates a FileStorage for the given API origin in the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn for_origin(api_url: &str) -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "fiksi")?;
        let dir = project_dirs.cache_dir().join(origin_dir_name(api_url));
        Some(Self::with_dir(dir))
    }

    /// Creates a FileStorage rooted at a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self {
            dir,
            capacity: None,
        }
    }

    /// Limits the total size of stored values to `bytes`
    pub fn with_capacity(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    /// Returns the directory entries are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file backing `key` and whether its name is hashed
    fn path_for(&self, key: &str) -> (PathBuf, bool) {
        let encoded = URL_SAFE_NO_PAD.encode(key);
        let (stem, hashed) = if encoded.len() <= MAX_ENCODED_STEM_LEN {
            (encoded, false)
        } else {
            let digest: String = Sha256::digest(key.as_bytes())
                .iter()
                .map(|byte| format!("{:02x}", byte))
                .collect();
            (format!("{}{}", HASHED_STEM_MARKER, digest), true)
        };
        (self.dir.join(format!("{}.{}", stem, FILE_EXTENSION)), hashed)
    }

    /// Reads the key recorded in the first line of a hashed file
    fn read_hashed_key(path: &Path) -> Result<Option<String>, StorageError> {
        let content = fs::read_to_string(path)?;
        Ok(content
            .split_once('\n')
            .and_then(|(header, _)| URL_SAFE_NO_PAD.decode(header).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok()))
    }

    /// Sums the sizes of every entry file except the one at `skip`
    fn used_bytes(&self, skip: &Path) -> Result<usize, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut total = 0usize;
        for entry in entries {
            let entry = entry?;
            if entry.path() == skip {
                continue;
            }
            total += entry.metadata()?.len() as usize;
        }
        Ok(total)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let (path, hashed) = self.path_for(key);
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !hashed {
            return Ok(Some(content));
        }
        // A hashed file only answers for the key it records
        let expected = URL_SAFE_NO_PAD.encode(key);
        Ok(content
            .split_once('\n')
            .filter(|(header, _)| *header == expected)
            .map(|(_, value)| value.to_string()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let (path, hashed) = self.path_for(key);
        let content = if hashed {
            format!("{}\n{}", URL_SAFE_NO_PAD.encode(key), value)
        } else {
            value.to_string()
        };

        if let Some(capacity) = self.capacity {
            let needed = self.used_bytes(&path)? + content.len();
            if needed > capacity {
                return Err(StorageError::QuotaExceeded { needed, capacity });
            }
        }

        fs::write(path, content)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key).0) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            // Files we did not name are skipped rather than reported
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let key = if stem.starts_with(HASHED_STEM_MARKER) {
                Self::read_hashed_key(&path)?
            } else {
                URL_SAFE_NO_PAD
                    .decode(stem)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            };
            if let Some(key) = key {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Keeps entries in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryStorage {
    /// Creates an empty, unbounded MemoryStorage
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty MemoryStorage that rejects writes past `bytes`
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            capacity: Some(bytes),
        }
    }

    /// Number of stored items, namespaced or not
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();

        if let Some(capacity) = self.capacity {
            let used: usize = items
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > capacity {
                return Err(StorageError::QuotaExceeded { needed, capacity });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.lock().keys().cloned().collect())
    }
}

/// Turns an API base URL into a directory name unique to its origin
///
/// `http://localhost:8000` becomes `localhost_8000`.
pub fn origin_dir_name(api_url: &str) -> String {
    let without_scheme = api_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(api_url);
    let origin = without_scheme.split('/').next().unwrap_or_default();

    origin
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
