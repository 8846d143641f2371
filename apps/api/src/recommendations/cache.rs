//! TTL memoization for recommendation lists.
//!
//! Entries are never swept: a stale entry stays until it is overwritten or the
//! cache is cleared, it just stops being returned.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Hit iff `now - stored_at < ttl`.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        (entry.stored_at.elapsed() < self.ttl).then(|| entry.value.clone())
    }

    pub fn set(&self, key: K, value: V) {
        self.entries.lock().insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60 * 60);

    #[tokio::test(start_paused = true)]
    async fn test_hit_before_ttl() {
        let cache = TtlCache::new(TTL);
        cache.set("courses_[]_8".to_string(), vec![1, 2, 3]);

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get(&"courses_[]_8".to_string()), Some(vec![1, 2, 3]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_at_exact_ttl() {
        let cache = TtlCache::new(TTL);
        cache.set("k", 1);

        tokio::time::advance(TTL).await;
        assert_eq!(cache.get(&"k"), None);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_restarts_ttl() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.set("k", "old");
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", "new");
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get(&"k"), Some("new"));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = TtlCache::new(TTL);
        cache.set(1, "a");
        cache.set(2, "b");
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&1), None);
    }

    #[tokio::test]
    async fn test_unknown_key_misses() {
        let cache: TtlCache<&str, u8> = TtlCache::new(TTL);
        assert_eq!(cache.get(&"nope"), None);
    }
}
