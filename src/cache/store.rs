//! Cache Store Module
//!
//! Key-value storage with a deadline per entry. Expired entries read as absent
//! and are removed lazily on lookup or in bulk by the sweeper task.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats};

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

// == Expiring Cache ==
/// Thread-safe map from string keys to values with a TTL per entry.
///
/// A single mutex guards the map. Every method takes it for one lookup or one
/// insert and releases it before returning, so it is never held across an
/// `.await`.
#[derive(Debug)]
pub struct ExpiringCache<V> {
    inner: Mutex<Inner<V>>,
}

impl<V: Clone> ExpiringCache<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        // A panic while holding the guard cannot leave the map half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // == Get ==
    /// Returns a clone of the live value stored under `key`.
    ///
    /// Returns `None` when the key is absent or its deadline has been reached.
    /// An expired entry found here is dropped on the spot.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_with_ttl(key).map(|(value, _)| value)
    }

    /// Like [`get`](Self::get), also returning the time the value has left.
    pub fn get_with_ttl(&self, key: &str) -> Option<(V, Duration)> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let now = Instant::now();

        let live = match inner.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                Some((entry.value.clone(), entry.ttl_remaining()))
            }
            Some(_) => {
                inner.entries.remove(key);
                inner.stats.record_expirations(1);
                None
            }
            None => None,
        };

        match live {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);

        live
    }

    // == Set ==
    /// Stores `value` under `key` until `ttl` from now.
    ///
    /// Any previous entry for the key, live or expired, is replaced.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut inner = self.lock();
        inner.entries.insert(key.into(), CacheEntry::new(value, ttl));
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let now = Instant::now();

        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - inner.entries.len();

        inner.stats.record_expirations(removed);
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    /// Number of stored entries, including ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl<V: Clone> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MINUTES: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let cache: ExpiringCache<String> = ExpiringCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let cache = ExpiringCache::new();

        cache.set("key1", "value1".to_string(), FIVE_MINUTES);

        assert_eq!(cache.get("key1").as_deref(), Some("value1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let cache: ExpiringCache<String> = ExpiringCache::new();
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let cache = ExpiringCache::new();

        cache.set("key1", 1, FIVE_MINUTES);
        cache.set("key1", 2, FIVE_MINUTES);

        assert_eq!(cache.get("key1"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_expiry_at_five_minute_boundary() {
        let cache = ExpiringCache::new();
        cache.set("database-abc", ("abc", "X"), FIVE_MINUTES);

        tokio::time::advance(Duration::from_secs(4 * 60 + 59)).await;
        assert_eq!(cache.get("database-abc"), Some(("abc", "X")));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("database-abc").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_get_with_ttl() {
        let cache = ExpiringCache::new();
        cache.set("block-root", "children", FIVE_MINUTES);

        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(
            cache.get_with_ttl("block-root"),
            Some(("children", Duration::from_secs(240)))
        );
        assert!(cache.get_with_ttl("block-other").is_none());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_expired_entry_is_replaced_not_merged() {
        let cache = ExpiringCache::new();
        cache.set("block-root", vec![1, 2], Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.set("block-root", vec![3], FIVE_MINUTES);

        assert_eq!(cache.get("block-root"), Some(vec![3]));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_lazy_purge_on_get() {
        let cache = ExpiringCache::new();
        cache.set("key1", "v", Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(1)).await;

        assert!(cache.get("key1").is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleanup_expired() {
        let cache = ExpiringCache::new();
        cache.set("key1", "value1", Duration::from_secs(1));
        cache.set("key2", "value2", Duration::from_secs(10));

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key2"), Some("value2"));
    }

    #[test]
    fn test_store_stats() {
        let cache = ExpiringCache::new();

        cache.set("key1", "value1", FIVE_MINUTES);
        cache.get("key1");
        cache.get("nonexistent");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(ExpiringCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("block-{}", i % 10);
                        cache.set(key.clone(), t * 1000 + i, FIVE_MINUTES);
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 10);
        assert_eq!(cache.stats().hits + cache.stats().misses, 800);
    }
}
