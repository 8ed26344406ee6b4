//! Bounded per-store peer cache with 2Q admission.
//!
//! Keys seen once sit in a FIFO "recent" queue; a key written again is
//! promoted to an LRU "frequent" queue. Eviction victimizes the recent
//! queue first, so regions reported a single time cannot displace regions
//! that keep coming back. Eviction is silent: the owner reconciles any
//! derived indices on its next pass over the region.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Capacity of each per-(store, kind) peer cache.
pub const PEER_CACHE_CAPACITY: usize = 1000;

/// Bounded key-value container with 2Q admission.
#[derive(Debug, Clone)]
pub struct PeerCache<K, V> {
    capacity: usize,
    // FIFO of first-touch keys, front = oldest.
    recent: VecDeque<K>,
    // LRU of re-touched keys, front = coldest.
    frequent: VecDeque<K>,
    entries: HashMap<K, V>,
}

impl<K, V> PeerCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            recent: VecDeque::new(),
            frequent: VecDeque::new(),
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Insert or overwrite a key.
    ///
    /// A key already present is promoted to the frequent queue and made its
    /// most recent entry. A new key enters the recent queue, evicting one
    /// victim first when the cache is full.
    pub fn put(&mut self, key: K, value: V) {
        if self.entries.contains_key(&key) {
            self.recent.retain(|k| k != &key);
            self.frequent.retain(|k| k != &key);
            self.frequent.push_back(key.clone());
            self.entries.insert(key, value);
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_one();
        }
        self.recent.push_back(key.clone());
        self.entries.insert(key, value);
    }

    /// Fetch without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.recent.retain(|k| k != key);
        self.frequent.retain(|k| k != key);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the current values, in no particular order.
    pub fn elems(&self) -> Vec<V> {
        self.entries.values().cloned().collect()
    }

    fn evict_one(&mut self) {
        let victim = match self.recent.pop_front() {
            Some(key) => key,
            None => match self.frequent.pop_front() {
                Some(key) => key,
                None => return,
            },
        };
        self.entries.remove(&victim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_peek_remove_roundtrip() {
        let mut cache: PeerCache<u64, &str> = PeerCache::new(4);
        assert!(cache.is_empty());
        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
        assert_eq!(cache.peek(&1), Some(&"a"));
        assert_eq!(cache.peek(&3), None);

        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.remove(&2), Some("b"));
        assert!(cache.is_empty());
    }

    #[test]
    fn overwrite_replaces_value() {
        let mut cache: PeerCache<u64, u32> = PeerCache::new(2);
        cache.put(1, 10);
        cache.put(1, 20);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek(&1), Some(&20));
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut cache: PeerCache<u64, u64> = PeerCache::new(3);
        for key in 0..50 {
            cache.put(key, key);
            assert!(cache.len() <= 3);
        }
    }

    #[test]
    fn retouched_keys_survive_one_shot_churn() {
        let mut cache: PeerCache<u64, u64> = PeerCache::new(3);
        cache.put(1, 1);
        // Second put promotes key 1 to the frequent queue.
        cache.put(1, 2);

        // Churn through one-shot keys well past capacity.
        for key in 100..120 {
            cache.put(key, key);
        }

        assert_eq!(cache.peek(&1), Some(&2));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn peek_does_not_protect_from_eviction() {
        let mut cache: PeerCache<u64, u64> = PeerCache::new(2);
        cache.put(1, 1);
        cache.put(2, 2);
        // Peeks must not count as touches.
        assert_eq!(cache.peek(&1), Some(&1));
        assert_eq!(cache.peek(&1), Some(&1));

        cache.put(3, 3);
        assert_eq!(cache.peek(&1), None);
        assert_eq!(cache.peek(&2), Some(&2));
        assert_eq!(cache.peek(&3), Some(&3));
    }

    #[test]
    fn frequent_queue_evicts_lru_when_recent_is_empty() {
        let mut cache: PeerCache<u64, u64> = PeerCache::new(2);
        cache.put(1, 1);
        cache.put(2, 2);
        // Promote both; recent queue is now empty.
        cache.put(1, 10);
        cache.put(2, 20);

        cache.put(3, 3);
        // Key 1 was the colder frequent entry.
        assert_eq!(cache.peek(&1), None);
        assert_eq!(cache.peek(&2), Some(&20));
        assert_eq!(cache.peek(&3), Some(&3));
    }

    #[test]
    fn elems_snapshots_current_values() {
        let mut cache: PeerCache<u64, u64> = PeerCache::new(4);
        cache.put(1, 10);
        cache.put(2, 20);
        let mut values = cache.elems();
        values.sort_unstable();
        assert_eq!(values, vec![10, 20]);
    }
}
