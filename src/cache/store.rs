//! The key-value store contract behind the read-through cache.

use crate::error::CacheUnavailableError;
use async_trait::async_trait;
use std::time::Duration;

/// `GET` / `SET` / `EXPIRE` over string keys holding JSON text.
#[async_trait]
pub trait CacheStore: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheUnavailableError>;

    /// Stores `value`, clearing any expiry previously set on `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheUnavailableError>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheUnavailableError>;

    /// `SET` followed by `EXPIRE`. Stores that can do both atomically override this.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheUnavailableError> {
        self.set(key, value).await?;
        self.expire(key, ttl).await
    }
}

/// Stand-in used when the real store could not be reached at startup.
/// Every operation fails, so the read-through cache always goes to the loader.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> CacheUnavailableError {
        CacheUnavailableError(self.reason.clone())
    }
}

#[async_trait]
impl CacheStore for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheUnavailableError> {
        Err(self.error())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CacheUnavailableError> {
        Err(self.error())
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<(), CacheUnavailableError> {
        Err(self.error())
    }
}
