//! In-process cache store with Redis-like `SET` / `EXPIRE` semantics.

use super::{
    clock::{Clock, SystemClock},
    store::CacheStore,
};
use crate::error::CacheUnavailableError;
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| now >= at)
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    entries: DashMap<String, MemoryEntry>,
    clock: Arc<dyn Clock>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Current value for `key`, honouring expiry, without the availability check.
    pub fn peek(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    /// Time left before `key` expires. `None` if absent or set without expiry.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        entry.expires_at.map(|at| at.saturating_duration_since(now))
    }

    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deadline `ttl` from now. A TTL too large to represent never expires.
    fn deadline(&self, ttl: Duration) -> Option<Instant> {
        self.clock.now().checked_add(ttl)
    }

    fn check_available(&self) -> Result<(), CacheUnavailableError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheUnavailableError("memory store marked unavailable".to_string()))
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheUnavailableError> {
        self.check_available()?;
        let now = self.clock.now();
        // Drop expired entries lazily, the way Redis does on access.
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            debug!("Memory store evicted expired key: {}", key);
            return Ok(None);
        }
        Ok(self.entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheUnavailableError> {
        self.check_available()?;
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheUnavailableError> {
        self.check_available()?;
        let deadline = self.deadline(ttl);
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = deadline;
        }
        Ok(())
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheUnavailableError> {
        self.check_available()?;
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: self.deadline(ttl),
            },
        );
        Ok(())
    }
}
