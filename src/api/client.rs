//! API client with an opt-in response cache
//!
//! `ApiClient` sits between the endpoint bindings and the `Transport`:
//!
//! - `get` serves a cacheable read from the `TtlStore` when a live entry
//!   exists, and otherwise calls the network and populates the store with the
//!   successful response.
//! - `send` is a plain, never-cached call.
//! - `mutate` calls the network and, only if that succeeds, invalidates the
//!   keys the caller says may now be stale.
//!
//! There is no coordination between concurrent calls. Two misses on the same
//! cold key both reach the network and the later populate wins. A read issued
//! before a mutation can populate after the mutation's invalidation; that
//! entry stays until its TTL lapses or the next invalidation of its key.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::error::ApiError;
use super::transport::{ApiRequest, HttpTransport, Method, Transport};
use crate::cache::{cache_key, CacheEvent, CacheEvents, InvalidationBounds, TtlStore};

/// Per-call caching choice for a read
///
/// Caching is opt-in: the default policy is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Whether to consult and populate the cache
    pub enabled: bool,
    /// Entry lifetime; the store's default TTL when `None`
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    /// Always go to the network and never populate
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Cache with the store's default TTL
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ttl: None,
        }
    }

    /// Cache for `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            enabled: true,
            ttl: Some(ttl),
        }
    }
}

/// Client for the forum API
#[derive(Debug, Clone)]
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    /// Response cache; `None` disables caching for every call
    store: Option<TtlStore>,
    /// Which list keys mutations invalidate
    bounds: InvalidationBounds,
    events: CacheEvents,
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client that never caches
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            store: None,
            bounds: InvalidationBounds::default(),
            events: CacheEvents::default(),
        }
    }

    /// Creates a client that caches through `store`
    pub fn with_cache(transport: T, store: TtlStore) -> Self {
        Self {
            store: Some(store),
            ..Self::new(transport)
        }
    }

    /// Replaces the invalidation bounds
    pub fn with_bounds(mut self, bounds: InvalidationBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> Option<&TtlStore> {
        self.store.as_ref()
    }

    pub fn bounds(&self) -> &InvalidationBounds {
        &self.bounds
    }

    /// Receives an event for every invalidation and clear from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Performs a cacheable GET
    ///
    /// # Arguments
    /// * `endpoint` - Path and query string; part of the cache key
    /// * `token` - Bearer token; when present the key is scoped to it
    /// * `policy` - Whether and for how long to cache
    ///
    /// # Behavior
    /// - With caching disabled (by policy or client), always calls the network
    /// - On a live cache hit, returns without calling the network
    /// - On a miss, calls the network; a response that decodes as `R` is
    ///   written to the cache before being returned
    /// - Failures are returned unchanged and never cached
    pub async fn get<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
        policy: CachePolicy,
    ) -> Result<R, ApiError> {
        let store = match (&self.store, policy.enabled) {
            (Some(store), true) => store,
            _ => return self.send::<R, ()>(Method::Get, endpoint, None, token).await,
        };

        let key = cache_key(endpoint, token);
        if let Some(cached) = store.get::<R>(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }
        debug!(%key, "cache miss");

        let value = self.call(Method::Get, endpoint, None, token).await?;
        let data = decode::<R>(value.clone())?;

        let ttl = policy.ttl.unwrap_or_else(|| store.default_ttl());
        store.set_with_ttl(&key, &value, ttl);

        Ok(data)
    }

    /// Performs an uncached call
    pub async fn send<R, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body.map(encode).transpose()?;
        let value = self.call(method, endpoint, body, token).await?;
        decode(value)
    }

    /// Performs a mutation, then invalidates `stale_keys` if it succeeded
    ///
    /// The keys are computed by the caller from the resource identity alone;
    /// nothing is looked up in the cache to find them.
    pub async fn mutate<R, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
        stale_keys: Vec<String>,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body.map(encode).transpose()?;
        let value = self.call(method, endpoint, body, token).await?;
        self.invalidate(stale_keys);
        decode(value)
    }

    /// Drops `keys` from the cache and announces it
    pub fn invalidate(&self, keys: Vec<String>) {
        if keys.is_empty() {
            return;
        }
        if let Some(store) = &self.store {
            debug!(count = keys.len(), "invalidating cache keys");
            store.invalidate_many(&keys);
        }
        self.events.publish(CacheEvent::Invalidated { keys });
    }

    /// Removes every cached response
    pub fn clear_cache(&self) {
        if let Some(store) = &self.store {
            store.clear_all();
        }
        self.events.publish(CacheEvent::Cleared);
    }

    /// Number of cached entries and their total stored size in bytes
    pub fn cache_usage(&self) -> (usize, usize) {
        self.store
            .as_ref()
            .map(|store| (store.entry_count(), store.usage_bytes()))
            .unwrap_or((0, 0))
    }

    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.transport
            .send(ApiRequest {
                endpoint,
                method,
                body,
                token,
            })
            .await
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::EncodeError(e.to_string()))
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::ParseError(e.to_string()))
}
