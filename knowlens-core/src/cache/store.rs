//! Layout cache store with LRU eviction and lazy invalidation

use crate::cache::{
    artifact::LayoutArtifact,
    config::CacheConfig,
    entry::CacheEntry,
    invalidation::InvalidationReason,
    types::{CacheKey, CacheStats, EntryStats},
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Capacity-bounded memoization layer over layout computations
///
/// Construct one per panel and share it behind an `Arc`:
/// - `get` never returns an invalidated artifact
/// - at most `max_cache_size` entries are resident
/// - the evicted entry always has the oldest access
///
/// No operation can fail; a miss is an ordinary `None`.
pub struct GraphCacheManager<A> {
    config: CacheConfig,

    store: RwLock<CacheStore<A>>,
}

/// Internal cache storage
struct CacheStore<A> {
    /// Main storage: key -> entry
    entries: HashMap<CacheKey, CacheEntry<A>>,

    /// Logical clock; bumped on every insert and successful read
    clock: u64,

    hits: u64,
    misses: u64,
    evictions: u64,
    invalidations: u64,
}

impl<A> CacheStore<A> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl<A: LayoutArtifact> GraphCacheManager<A> {
    /// Create a new cache with the given configuration
    ///
    /// A zero capacity is raised to one slot.
    pub fn new(mut config: CacheConfig) -> Self {
        if config.max_cache_size == 0 {
            warn!("Layout cache capacity of 0 requested; using 1");
            config.max_cache_size = 1;
        }
        info!("Initializing layout cache (max_cache_size: {})", config.max_cache_size);

        Self {
            config,
            store: RwLock::new(CacheStore {
                entries: HashMap::new(),
                clock: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
                invalidations: 0,
            }),
        }
    }

    /// Create a cache holding at most `max_cache_size` entries
    pub fn with_capacity(max_cache_size: usize) -> Self {
        Self::new(CacheConfig::builder().max_cache_size(max_cache_size).build())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert or overwrite the artifact for `key`
    pub async fn set(&self, key: impl Into<CacheKey>, artifact: A) {
        self.set_shared(key, Arc::new(artifact)).await
    }

    /// Insert an already shared artifact
    ///
    /// A new key arriving at a full cache evicts the least recently used
    /// entry first. Overwriting a resident key never evicts.
    pub async fn set_shared(&self, key: impl Into<CacheKey>, artifact: Arc<A>) {
        let key = key.into();
        let mut store = self.store.write().await;

        if !store.entries.contains_key(&key) {
            while store.entries.len() >= self.config.max_cache_size {
                if !self.evict_lru(&mut store) {
                    break;
                }
            }
        }

        let tick = store.tick();
        let entry = CacheEntry::new(key.clone(), artifact, tick);
        if store.entries.insert(key.clone(), entry).is_some() {
            debug!("Updated layout cache entry: {}", key);
        } else {
            debug!("Inserted layout cache entry: {}", key);
        }
    }

    /// Get the artifact for `key`, refreshing its recency
    ///
    /// An entry flagged by [`invalidate`](Self::invalidate) is removed here
    /// and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<Arc<A>> {
        let mut store = self.store.write().await;

        let valid = match store.entries.get(key) {
            Some(entry) => entry.is_valid(),
            None => {
                debug!("Layout cache miss: {}", key);
                self.record_miss(&mut store);
                return None;
            }
        };

        if !valid {
            self.record_miss(&mut store);
            self.remove_entry(&mut store, key, InvalidationReason::StaleRead);
            return None;
        }

        let tick = store.tick();
        let artifact = store.entries.get_mut(key).map(|entry| {
            entry.mark_accessed(tick);
            Arc::clone(&entry.artifact)
        });
        if self.config.enable_metrics {
            store.hits += 1;
        }

        debug!("Layout cache hit: {}", key);
        artifact
    }

    /// Return the cached artifact or compute, store, and return a fresh one
    ///
    /// The lock is not held while `compute` runs.
    pub async fn get_or_insert_with<F, Fut>(&self, key: &str, compute: F) -> Arc<A>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = A>,
    {
        if let Some(artifact) = self.get(key).await {
            return artifact;
        }

        let artifact = Arc::new(compute().await);
        self.set_shared(key, Arc::clone(&artifact)).await;
        artifact
    }

    /// Flag the entry for `key` as invalid; a no-op for unknown keys
    ///
    /// The slot is reclaimed on the next `get` or by LRU eviction.
    pub async fn invalidate(&self, key: &str) {
        let mut store = self.store.write().await;

        if let Some(entry) = store.entries.get_mut(key) {
            entry.invalidate();
            debug!("Flagged layout cache entry as invalid: {}", key);
        }
    }

    /// Flag every entry invalid, then drop them all
    pub async fn invalidate_all(&self) {
        let mut store = self.store.write().await;

        for entry in store.entries.values_mut() {
            entry.invalidate();
        }
        let keys: Vec<CacheKey> = store.entries.keys().cloned().collect();
        for key in &keys {
            self.remove_entry(&mut store, key, InvalidationReason::InvalidateAll);
        }

        info!("Invalidated {} layout cache entries", keys.len());
    }

    /// Drop every entry without flagging
    pub async fn clear(&self) {
        let mut store = self.store.write().await;

        let count = store.entries.len();
        store.entries.clear();

        info!(
            "Removed {} entries from layout cache ({})",
            count,
            InvalidationReason::Cleared
        );
    }

    /// Diagnostics snapshot; does not touch recency
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;

        let mut entries: Vec<EntryStats> = store
            .entries
            .values()
            .map(|entry| EntryStats {
                key: entry.key.clone(),
                node_count: entry.artifact.node_count(),
                edge_count: entry.artifact.edge_count(),
                access_count: entry.metadata.access_count,
                last_accessed: entry.metadata.last_accessed,
                is_valid: entry.metadata.is_valid,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: store.entries.len(),
            max_size: self.config.max_cache_size,
            entries,
            hits: store.hits,
            misses: store.misses,
            evictions: store.evictions,
            invalidations: store.invalidations,
        }
    }

    /// Check residency without refreshing recency (flagged entries count)
    pub async fn contains_key(&self, key: &str) -> bool {
        let store = self.store.read().await;
        store.entries.contains_key(key)
    }

    /// Get number of resident entries
    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        let store = self.store.read().await;
        store.entries.is_empty()
    }

    fn record_miss(&self, store: &mut CacheStore<A>) {
        if self.config.enable_metrics {
            store.misses += 1;
        }
    }

    /// Internal: Remove an entry from the store
    fn remove_entry(&self, store: &mut CacheStore<A>, key: &str, reason: InvalidationReason) {
        if store.entries.remove(key).is_some() {
            debug!("Removed layout cache entry ({}): {}", reason, key);
            if self.config.enable_metrics {
                if reason.is_eviction() {
                    store.evictions += 1;
                } else {
                    store.invalidations += 1;
                }
            }
        }
    }

    /// Internal: Evict the entry with the oldest access; false when empty
    ///
    /// Linear scan: the cache is small and bounded. The logical clock makes
    /// ties impossible, so the choice is deterministic.
    fn evict_lru(&self, store: &mut CacheStore<A>) -> bool {
        let oldest = store
            .entries
            .values()
            .min_by_key(|entry| entry.metadata.access_tick)
            .map(|entry| entry.key.clone());

        match oldest {
            Some(key) => {
                self.remove_entry(store, &key, InvalidationReason::LeastRecentlyUsed);
                true
            }
            None => false,
        }
    }
}
