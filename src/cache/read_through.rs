//! Read-through cache in front of a remote loader.
//!
//! `fetch` looks the key up in the store, returns the cached value on a hit and
//! otherwise runs the loader once, stores its result (with expiry when a TTL is
//! given) and returns it. The store is best-effort: if it cannot be reached the
//! loader's value is returned uncached and no error surfaces.

use super::store::CacheStore;
use crate::error::RemoteFetchError;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt,
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// Counters for cache effectiveness.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    degraded: AtomicU64,
    write_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Calls served straight from the loader because the store was unreachable
    pub degraded: u64,
    pub write_failures: u64,
}

impl CacheMetricsSnapshot {
    /// Hits over all lookups that reached the store.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl CacheMetrics {
    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
pub struct ReadThroughCache {
    store: Arc<dyn CacheStore>,
    metrics: Arc<CacheMetrics>,
}

impl fmt::Debug for ReadThroughCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("store", &self.store.name())
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

impl ReadThroughCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Returns the value cached under `key`, or runs `loader` once and caches its result.
    ///
    /// `ttl: None` caches until external eviction. Loader errors propagate and leave the
    /// store untouched. Store errors are logged and never returned.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &str,
        loader: F,
        ttl: Option<Duration>,
    ) -> Result<T, RemoteFetchError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteFetchError>>,
    {
        if key.is_empty() {
            return Err(RemoteFetchError::InvalidRequest(
                "cache key must not be empty".to_string(),
            ));
        }

        match self.store.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str::<T>(&payload) {
                Ok(value) => {
                    self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                    debug!("Cache HIT for key: {}", key);
                    return Ok(value);
                }
                Err(e) => {
                    // Shape changed since it was written; reload and overwrite.
                    warn!("Failed to deserialize cached JSON for key {}: {}. Reloading.", key, e);
                }
            },
            Ok(None) => debug!("Cache MISS for key: {}", key),
            Err(e) => {
                self.metrics.degraded.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Cache store '{}' unavailable for key {} ({}); loading without cache",
                    self.store.name(),
                    key,
                    e
                );
                return loader().await;
            }
        }

        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        let value = loader().await.map_err(|e| {
            warn!("Loader failed for key {}: {}", key, e);
            e
        })?;
        self.store_value(key, &value, ttl).await;
        Ok(value)
    }

    async fn store_value<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                self.metrics.write_failures.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to serialize value for key {}: {}. Not caching.", key, e);
                return;
            }
        };

        let result = match ttl {
            Some(ttl) => self.store.set_with_expiry(key, &payload, ttl).await,
            None => self.store.set(key, &payload).await,
        };
        match result {
            Ok(()) => debug!("Cached key {} (ttl: {:?})", key, ttl),
            Err(e) => {
                self.metrics.write_failures.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to cache key {}: {}", key, e);
            }
        }
    }
}
