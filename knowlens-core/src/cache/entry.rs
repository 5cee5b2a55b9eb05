//! Cache entry bookkeeping

use crate::cache::types::CacheKey;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A resident cache entry
///
/// The artifact is shared behind an `Arc` so a reader keeps its copy even
/// after the entry is invalidated or evicted.
#[derive(Debug)]
pub struct CacheEntry<A> {
    /// The cache key
    pub key: CacheKey,

    /// The cached artifact
    pub artifact: Arc<A>,

    /// Entry metadata
    pub metadata: CacheMetadata,
}

impl<A> CacheEntry<A> {
    /// Create a fresh entry stamped with the given access tick
    pub fn new(key: CacheKey, artifact: Arc<A>, tick: u64) -> Self {
        let now = Utc::now();

        Self {
            key,
            artifact,
            metadata: CacheMetadata {
                created_at: now,
                last_accessed: now,
                access_tick: tick,
                access_count: 0,
                is_valid: true,
            },
        }
    }

    /// Mark the entry as read (updates recency and count)
    pub fn mark_accessed(&mut self, tick: u64) {
        self.metadata.last_accessed = Utc::now();
        self.metadata.access_tick = tick;
        self.metadata.access_count += 1;
    }

    /// Flag the entry so the next read drops it
    pub fn invalidate(&mut self) {
        self.metadata.is_valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.metadata.is_valid
    }
}

/// Metadata associated with a cache entry
#[derive(Debug, Clone)]
pub struct CacheMetadata {
    /// When the entry was stored
    pub created_at: DateTime<Utc>,

    /// Wall-clock time of the last successful read (or of insertion)
    pub last_accessed: DateTime<Utc>,

    /// Logical clock value of the last access; orders LRU eviction
    pub access_tick: u64,

    /// Number of successful reads
    pub access_count: u64,

    /// Cleared by explicit invalidation
    pub is_valid: bool,
}
