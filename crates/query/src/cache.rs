//! Per-session response cache with request coalescing.
//!
//! Responses are keyed by the quantized request key and expire lazily after a
//! TTL. Concurrent identical requests are coalesced through a per-key lock so
//! only the first caller computes; the rest wait and hit the cache.

use crate::QueryResponse;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Cache hit/miss counters, readable without locking the cache itself.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub expired: AtomicU64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

struct CachedEntry {
    response: Arc<QueryResponse>,
    inserted_at: Instant,
}

/// LRU + TTL cache of query responses for one session.
pub struct SessionCache {
    entries: RwLock<LruCache<String, CachedEntry>>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    ttl: Duration,
    stats: CacheStats,
}

impl SessionCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            key_locks: Mutex::new(HashMap::new()),
            ttl,
            stats: CacheStats::default(),
        }
    }

    /// Look up a response. Expired entries are dropped on access.
    pub async fn get(&self, key: &str) -> Option<Arc<QueryResponse>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.response))
            }
            Some(_) => {
                entries.pop(key);
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache entry expired");
                None
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub async fn insert(&self, key: String, response: Arc<QueryResponse>) {
        let mut entries = self.entries.write().await;
        if entries.len() == entries.cap().get() && !entries.contains(&key) {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
        }
        entries.put(
            key,
            CachedEntry {
                response,
                inserted_at: Instant::now(),
            },
        );
    }

    /// The coalescing lock for a key. Callers hold the lock across the
    /// lookup-compute-insert sequence so concurrent identical requests run
    /// the pipeline once.
    pub async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        // Drop guards nobody is waiting on before growing the map.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
