//! Bounded correlation cache
//!
//! Maps the id of a triggering command message to the announcement the bot
//! posted for it. Capacity is fixed at construction; once exceeded, the
//! oldest inserted entry is evicted. Reads never refresh an entry.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tokio::sync::RwLock;
use tracing::debug;

/// Number of announcements kept for edit propagation by default.
pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Debug)]
struct Entries<K, V> {
    values: HashMap<K, V>,
    order: VecDeque<K>,
}

/// Fixed-capacity map with insertion-order eviction, safe to share across tasks
#[derive(Debug)]
pub struct CorrelationCache<K, V> {
    entries: RwLock<Entries<K, V>>,
    capacity: usize,
}

impl<K, V> Default for CorrelationCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> CorrelationCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(Entries {
                values: HashMap::with_capacity(capacity + 1),
                order: VecDeque::with_capacity(capacity + 1),
            }),
            capacity,
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an entry, evicting the oldest one if the cache overflows.
    ///
    /// Re-inserting a key replaces its value but keeps its original
    /// position in the eviction order.
    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.values.get_mut(&key) {
            *existing = value;
            return;
        }

        entries.values.insert(key.clone(), value);
        entries.order.push_back(key);

        while entries.values.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.values.remove(&oldest);
            debug!("Evicted correlation entry {:?}", oldest);
        }
    }

    /// Look up an entry without touching the eviction order.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries.values.get(key).cloned()
    }

    /// Current number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.values.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.values.is_empty()
    }

    /// Keys from oldest to newest insertion.
    pub async fn keys(&self) -> Vec<K> {
        self.entries.read().await.order.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache: CorrelationCache<u64, &str> = CorrelationCache::new(2);
        assert_eq!(cache.get(&1).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_evicts_oldest_inserted() {
        let cache = CorrelationCache::new(2);
        cache.put(1_u64, "a").await;
        cache.put(2, "b").await;
        cache.put(3, "c").await;

        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.get(&2).await, Some("b"));
        assert_eq!(cache.get(&3).await, Some("c"));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_reads_do_not_refresh_order() {
        let cache = CorrelationCache::new(2);
        cache.put(1_u64, "a").await;
        cache.put(2, "b").await;

        // An LRU would keep 1 here.
        assert_eq!(cache.get(&1).await, Some("a"));
        cache.put(3, "c").await;

        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.keys().await, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_reinsert_keeps_position() {
        let cache = CorrelationCache::new(2);
        cache.put(1_u64, "a").await;
        cache.put(2, "b").await;
        cache.put(1, "a2").await;

        assert_eq!(cache.get(&1).await, Some("a2"));
        assert_eq!(cache.len().await, 2);

        cache.put(3, "c").await;
        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.keys().await, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let cache = CorrelationCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(1_u64, "a").await;
        cache.put(2, "b").await;
        assert_eq!(cache.keys().await, vec![2]);
    }

    #[tokio::test]
    async fn test_concurrent_puts_respect_capacity() {
        let cache = Arc::new(CorrelationCache::new(DEFAULT_CAPACITY));
        let mut handles = Vec::new();
        for i in 0..64_u64 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.put(i, i * 10).await;
                cache.get(&i).await
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }

        assert_eq!(cache.len().await, DEFAULT_CAPACITY);
        for key in cache.keys().await {
            assert_eq!(cache.get(&key).await, Some(key * 10));
        }
    }
}
