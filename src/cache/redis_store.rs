// src/cache/redis_store.rs
//! Redis-backed cache store.

use super::{policy::MAX_TTL, store::CacheStore};
use crate::error::CacheUnavailableError;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::{fmt, future::Future, time::Duration};

/// A shared Redis store.
/// Uses a `ConnectionManager` for automatic reconnection and resilience.
#[derive(Clone)]
pub struct RedisStore {
    conn_manager: ConnectionManager,
    redis_url: String,
    op_timeout: Duration,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("redis_url", &self.redis_url)
            .field("op_timeout", &self.op_timeout)
            .field("conn_manager", &"<ConnectionManager instance>")
            .finish()
    }
}

/// Redis expiries have whole-second granularity; round up so short TTLs never become `EXPIRE 0`.
/// Capped at `MAX_TTL`, well inside what Redis accepts.
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
    secs.clamp(1, MAX_TTL.as_secs())
}

impl RedisStore {
    /// Connects to `redis_url`.
    /// Both the initial connect and every later command are bounded by `op_timeout`.
    pub async fn connect(
        redis_url: &str,
        op_timeout: Duration,
    ) -> Result<Self, CacheUnavailableError> {
        info!("Initializing Redis connection manager for URL: {}", redis_url);
        let client = redis::Client::open(redis_url)?;
        let connect = ConnectionManager::new(client);
        let conn_manager = match tokio::time::timeout(op_timeout, connect).await {
            Ok(Ok(manager)) => manager,
            Ok(Err(e)) => {
                error!("Failed to create Redis ConnectionManager: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                error!("Timed out after {:?} connecting to Redis", op_timeout);
                return Err(CacheUnavailableError(format!(
                    "connect to {} timed out after {:?}",
                    redis_url, op_timeout
                )));
            }
        };
        info!("Redis ConnectionManager initialized successfully.");
        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
            op_timeout,
        })
    }

    async fn run<T, Fut>(&self, op: &str, key: &str, fut: Fut) -> Result<T, CacheUnavailableError>
    where
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Redis {} error for key {}: {}", op, key, e);
                Err(e.into())
            }
            Err(_) => {
                warn!("Redis {} timed out for key {}", op, key);
                Err(CacheUnavailableError(format!(
                    "{} {} timed out after {:?}",
                    op, key, self.op_timeout
                )))
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheUnavailableError> {
        debug!("Attempting to GET cache for key: {}", key);
        let mut conn = self.conn_manager.clone();
        self.run("GET", key, async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheUnavailableError> {
        let mut conn = self.conn_manager.clone();
        self.run("SET", key, async move { conn.set::<_, _, ()>(key, value).await })
            .await?;
        debug!("Cache SET success for key: {}", key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheUnavailableError> {
        let secs = i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX);
        let mut conn = self.conn_manager.clone();
        self.run("EXPIRE", key, async move { conn.expire::<_, ()>(key, secs).await })
            .await
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheUnavailableError> {
        let secs = ttl_secs(ttl);
        let mut conn = self.conn_manager.clone();
        self.run("SETEX", key, async move {
            conn.set_ex::<_, _, ()>(key, value, secs).await
        })
        .await?;
        debug!("Cache SETEX success for key: {} with TTL: {}s", key, secs);
        Ok(())
    }
}
