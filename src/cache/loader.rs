//! Read-Through Loader Module
//!
//! Serves values from an [`ExpiringCache`] and falls back to a caller-supplied
//! fetch on a miss.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::ExpiringCache;

/// TTL applied to every successfully loaded value.
pub const LOAD_TTL: Duration = Duration::from_secs(5 * 60);

// == Read Through ==
/// Read-through front for a shared [`ExpiringCache`].
///
/// Concurrent misses on the same key are not coalesced: each caller that
/// finds the key absent runs its own fetch and the last write wins.
#[derive(Debug)]
pub struct ReadThrough<V> {
    cache: Arc<ExpiringCache<V>>,
}

impl<V> Clone for ReadThrough<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<V: Clone> ReadThrough<V> {
    pub fn new(cache: Arc<ExpiringCache<V>>) -> Self {
        Self { cache }
    }

    /// The underlying cache, shared with the sweeper and the stats endpoint.
    pub fn cache(&self) -> &Arc<ExpiringCache<V>> {
        &self.cache
    }

    // == Load ==
    /// Returns the live value under `key`, or awaits `fetch` and caches its
    /// result for [`LOAD_TTL`].
    ///
    /// A failed fetch is returned as-is and leaves the cache untouched, so the
    /// next call for the same key fetches again.
    pub async fn load<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some((value, ttl)) = self.cache.get_with_ttl(key) {
            debug!(key, ttl_remaining_secs = ttl.as_secs(), "cache hit");
            return Ok(value);
        }

        debug!(key, "cache miss, fetching");
        let value = fetch().await?;

        self.cache.set(key, value.clone(), LOAD_TTL);
        Ok(value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn loader() -> ReadThrough<String> {
        ReadThrough::new(Arc::new(ExpiringCache::new()))
    }

    #[tokio::test]
    async fn test_load_fetches_once_then_hits() {
        let loader = loader();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("children".to_string())
        };

        let first = loader.load("block-root", fetch).await.unwrap();
        let second = loader.load("block-root", fetch).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_failure_is_not_cached() {
        let loader = loader();

        let err = loader
            .load("block-root", || async { Err::<String, _>("upstream 500") })
            .await
            .unwrap_err();

        assert_eq!(err, "upstream 500");
        assert!(loader.cache().get("block-root").is_none());
        assert!(loader.cache().is_empty());
    }

    #[tokio::test]
    async fn test_load_retries_after_failure() {
        let loader = loader();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let _ = loader
            .load("database-abc", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>("boom")
            })
            .await;
        let value = loader
            .load("database-abc", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>("abc".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "abc");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_uses_fixed_ttl() {
        let loader = loader();
        loader
            .load("database-query-abc", || async { Ok::<_, ()>("rows".to_string()) })
            .await
            .unwrap();

        tokio::time::advance(LOAD_TTL - Duration::from_secs(1)).await;
        assert!(loader.cache().get("database-query-abc").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(loader.cache().get("database-query-abc").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_refetches_after_expiry() {
        let loader = loader();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let fetch = move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(format!("v{n}"))
        };

        assert_eq!(loader.load("block-x", fetch).await.unwrap(), "v0");
        tokio::time::advance(LOAD_TTL + Duration::from_secs(1)).await;
        assert_eq!(loader.load("block-x", fetch).await.unwrap(), "v1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_leaves_cache_untouched() {
        let loader = loader();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let slow = loader.load("block-root", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, ()>("late".to_string())
        });
        let timed_out = tokio::time::timeout(Duration::from_secs(1), slow).await;

        assert!(timed_out.is_err());
        assert!(loader.cache().get("block-root").is_none());

        let value = loader
            .load("block-root", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>("fresh".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_share_entries() {
        let loader = loader();

        loader
            .load("block-abc", || async { Ok::<_, ()>("block".to_string()) })
            .await
            .unwrap();
        let database = loader
            .load("database-abc", || async { Ok::<_, ()>("database".to_string()) })
            .await
            .unwrap();

        assert_eq!(database, "database");
        assert_eq!(loader.cache().len(), 2);
    }
}
