//! Process-local TTL cache.
//!
//! Entries expire `ttl` after insertion. Expired entries are dropped when
//! touched, on every insert, and by the periodic task from
//! [`TtlCache::spawn_cleanup`]. At capacity the oldest entry is evicted.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<K, Entry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        let fresh = match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            },
            None => None,
        };
        drop(entries);
        let counter = if fresh.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        fresh
    }

    pub fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(key, Entry { value, inserted_at: now, expires_at: now + self.ttl });
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().remove(key).map(|entry| entry.value)
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(entries.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            ttl_secs: self.ttl.as_secs(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Spawn a task that purges expired entries every `interval`.
    pub fn spawn_cleanup(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = self.len(), "purged expired cache entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_get_returns_fresh_value_and_counts_hits() {
        let cache: TtlCache<String, u32> = TtlCache::new(TTL, 10);
        cache.insert("RRP-1".to_owned(), 1);
        assert_eq!(cache.get("RRP-1"), Some(1));
        assert_eq!(cache.get("RRP-2"), None);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted_on_access() {
        let cache: TtlCache<String, u32> = TtlCache::new(TTL, 10);
        cache.insert("k".to_owned(), 7);
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let cache: TtlCache<u32, u32> = TtlCache::new(TTL, 2);
        cache.insert(1, 10);
        tokio::time::advance(Duration::from_millis(5)).await;
        cache.insert(2, 20);
        tokio::time::advance(Duration::from_millis(5)).await;
        cache.insert(3, 30);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(20));
        assert_eq!(cache.get(&3), Some(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reinsert_at_capacity_keeps_other_entries() {
        let cache: TtlCache<u32, u32> = TtlCache::new(TTL, 2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(2, 21);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&2), Some(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_counts_removed() {
        let cache: TtlCache<u32, u32> = TtlCache::new(TTL, 10);
        cache.insert(1, 1);
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.insert(2, 2);
        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get(&2), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_purges_periodically() {
        let cache: Arc<TtlCache<u32, u32>> = Arc::new(TtlCache::new(TTL, 10));
        cache.insert(1, 1);
        let handle = Arc::clone(&cache).spawn_cleanup(Duration::from_secs(10));
        tokio::time::sleep(TTL + Duration::from_secs(15)).await;
        assert!(cache.is_empty());
        handle.abort();
    }
}
