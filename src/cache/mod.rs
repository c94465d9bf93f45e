//! Cache module for storing API responses
//!
//! This module provides a TTL store that persists API responses through a
//! pluggable storage substrate, the key derivation used to address responses,
//! and a broadcast channel announcing invalidations. Every cache operation is
//! fail-soft: a broken substrate behaves like an always-empty cache.

pub mod clock;
pub mod events;
pub mod keys;
pub mod storage;
mod store;


pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{CacheEvent, CacheEvents};
pub use keys::{cache_key, paginated_endpoint, InvalidationBounds};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CacheEntry, TtlStore, CACHE_PREFIX, DEFAULT_TTL};
