//! Bounded cache with TTL eviction
//!
//! An explicit, injectable replacement for hidden module-level fetch
//! caches: whichever component performs a fetch owns one of these and
//! passes it where needed.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Bounded key-value cache whose entries expire after a fixed TTL
///
/// Expired entries are pruned lazily on access; when the cache is full,
/// the oldest live entry is evicted to make room.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, (Instant, V)>,
    capacity: usize,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    /// Create a cache holding at most `capacity` entries for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            ttl,
        }
    }

    /// Look up a live entry, cloning the value
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some((inserted, value)) if now.duration_since(*inserted) < self.ttl => {
                Some(value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a value, evicting expired entries first and then the
    /// oldest live entry if still at capacity
    pub fn insert(&mut self, key: K, value: V) {
        let now = Instant::now();
        self.entries
            .retain(|_, (inserted, _)| now.duration_since(*inserted) < self.ttl);

        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, (inserted, _))| *inserted)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(key, (now, value));
    }

    /// Number of entries currently stored (live or not yet pruned)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn hit_within_ttl() {
        let mut cache = TtlCache::new(4, Duration::from_secs(60));
        cache.insert("q", vec![1, 2, 3]);
        assert_eq!(cache.get(&"q"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let mut cache = TtlCache::new(4, Duration::from_millis(10));
        cache.insert("q", 1);
        sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"q"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut cache = TtlCache::new(2, Duration::from_secs(60));
        cache.insert("a", 1);
        sleep(Duration::from_millis(2));
        cache.insert("b", 2);
        sleep(Duration::from_millis(2));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None); // Oldest evicted
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn reinsert_refreshes_existing_key() {
        let mut cache = TtlCache::new(2, Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10); // Not an eviction, same key

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(10));
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = TtlCache::new(4, Duration::from_secs(60));
        cache.insert("a", 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
