//! Integration tests for the read-through cache contract
//!
//! These tests drive `ReadThroughCache::fetch` against the in-memory store with a
//! manual clock, so TTL expiry is exercised without sleeping.

use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use stock_dashboard::{
    cache::{CacheStore, ManualClock, MemoryStore, ReadThroughCache, UnavailableStore},
    RemoteFetchError,
};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Logo {
    url: String,
}

fn aapl_logo() -> Logo {
    Logo {
        url: "https://storage.googleapis.com/iexcloud-hl37opg/api/logos/AAPL.png".to_string(),
    }
}

fn setup() -> (Arc<ManualClock>, Arc<MemoryStore>, ReadThroughCache) {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    let cache = ReadThroughCache::new(store.clone());
    (clock, store, cache)
}

/// Loader that counts invocations and returns `value`.
async fn counted<T>(calls: &AtomicUsize, value: T) -> Result<T, RemoteFetchError> {
    calls.fetch_add(1, Ordering::SeqCst);
    Ok(value)
}

async fn must_not_load() -> Result<Logo, RemoteFetchError> {
    Err(RemoteFetchError::Network(
        "loader invoked on a cache hit".to_string(),
    ))
}

#[tokio::test]
async fn test_miss_invokes_loader_once_and_stores_with_ttl() {
    let (_clock, store, cache) = setup();
    let calls = AtomicUsize::new(0);

    let logo = cache
        .fetch("AAPL_logo", || counted(&calls, aapl_logo()), Some(DAY))
        .await
        .unwrap();

    assert_eq!(logo, aapl_logo());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stored = store.peek("AAPL_logo").expect("value stored");
    assert_eq!(serde_json::from_str::<Logo>(&stored).unwrap(), aapl_logo());
    assert_eq!(store.ttl_remaining("AAPL_logo"), Some(DAY));
}

#[tokio::test]
async fn test_hit_within_ttl_does_not_invoke_loader() {
    let (clock, _store, cache) = setup();
    let calls = AtomicUsize::new(0);

    cache
        .fetch("AAPL_logo", || counted(&calls, aapl_logo()), Some(DAY))
        .await
        .unwrap();
    clock.advance(Duration::from_secs(23 * 60 * 60));

    let again = cache
        .fetch("AAPL_logo", must_not_load, Some(DAY))
        .await
        .expect("served from cache");
    assert_eq!(again, aapl_logo());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.metrics().hits, 1);
}

#[tokio::test]
async fn test_loader_runs_again_after_ttl_elapses() {
    let (clock, _store, cache) = setup();
    let calls = AtomicUsize::new(0);
    let ttl = Duration::from_secs(60);

    let first: u32 = cache.fetch("AAPL_stats", || counted(&calls, 1), Some(ttl)).await.unwrap();
    clock.advance(ttl);
    let second: u32 = cache.fetch("AAPL_stats", || counted(&calls, 2), Some(ttl)).await.unwrap();

    assert_eq!((first, second), (1, 2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_ttl_caches_until_eviction() {
    let (clock, store, cache) = setup();
    let calls = AtomicUsize::new(0);

    let _: Vec<String> = cache
        .fetch("AAPL_news", || counted(&calls, vec!["headline".to_string()]), None)
        .await
        .unwrap();
    assert_eq!(store.ttl_remaining("AAPL_news"), None);

    clock.advance(DAY * 365);
    let cached: Vec<String> = cache
        .fetch("AAPL_news", || counted(&calls, vec![]), None)
        .await
        .unwrap();
    assert_eq!(cached, vec!["headline".to_string()]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unrepresentable_ttl_caches_without_expiry() {
    let (clock, store, cache) = setup();
    let calls = AtomicUsize::new(0);
    let forever = Some(Duration::from_secs(u64::MAX));

    let first: u32 = cache.fetch("AAPL_stats", || counted(&calls, 1), forever).await.unwrap();
    clock.advance(DAY * 365);
    let second: u32 = cache.fetch("AAPL_stats", || counted(&calls, 2), forever).await.unwrap();

    assert_eq!((first, second), (1, 1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.ttl_remaining("AAPL_stats"), None);
}

#[tokio::test]
async fn test_unreachable_store_degrades_to_loader() {
    let (_clock, store, cache) = setup();
    store.set_available(false);
    let calls = AtomicUsize::new(0);

    let first = cache
        .fetch("AAPL_logo", || counted(&calls, aapl_logo()), Some(DAY))
        .await
        .expect("no error when cache is down");
    let second = cache
        .fetch("AAPL_logo", || counted(&calls, aapl_logo()), Some(DAY))
        .await
        .expect("no error when cache is down");

    assert_eq!(first, aapl_logo());
    assert_eq!(second, aapl_logo());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.metrics().degraded, 2);

    store.set_available(true);
    assert!(store.get("AAPL_logo").await.unwrap().is_none());
}

#[tokio::test]
async fn test_store_unavailable_from_startup() {
    let cache = ReadThroughCache::new(Arc::new(UnavailableStore::new("connection refused")));
    let calls = AtomicUsize::new(0);
    let value: u32 = cache.fetch("MSFT_stats", || counted(&calls, 42), None).await.unwrap();
    assert_eq!(value, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_loader_failure_propagates_and_leaves_key_absent() {
    let (_clock, store, cache) = setup();

    let result: Result<Logo, _> = cache
        .fetch(
            "AAPL_logo",
            || async { Err(RemoteFetchError::Auth("invalid token".to_string())) },
            Some(DAY),
        )
        .await;

    assert_eq!(result, Err(RemoteFetchError::Auth("invalid token".to_string())));
    assert!(store.peek("AAPL_logo").is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_keys_are_independent() {
    let (clock, _store, cache) = setup();
    let calls = AtomicUsize::new(0);

    let _: u32 = cache
        .fetch("AAPL_stats", || counted(&calls, 1), Some(Duration::from_secs(10)))
        .await
        .unwrap();
    let _: u32 = cache.fetch("AAPL_dividends", || counted(&calls, 2), None).await.unwrap();
    clock.advance(Duration::from_secs(10));

    let dividends: u32 = cache.fetch("AAPL_dividends", || counted(&calls, 99), None).await.unwrap();
    let stats: u32 = cache.fetch("AAPL_stats", || counted(&calls, 3), None).await.unwrap();
    assert_eq!((dividends, stats), (2, 3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_concurrent_misses_last_write_wins() {
    let (_clock, store, cache) = setup();
    let calls = AtomicUsize::new(0);

    let (a, b) = tokio::join!(
        cache.fetch("AAPL_company", || counted(&calls, "v1".to_string()), None),
        cache.fetch("AAPL_company", || counted(&calls, "v2".to_string()), None),
    );
    assert!(a.is_ok() && b.is_ok());
    assert!(calls.load(Ordering::SeqCst) >= 1);
    let stored = store.peek("AAPL_company").unwrap();
    assert!(stored == "\"v1\"" || stored == "\"v2\"");
}
