//! Core type definitions for the cache system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type - opaque to the cache, built by the caller
pub type CacheKey = String;

/// Per-entry diagnostics row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStats {
    pub key: CacheKey,

    /// Node count reported by the cached artifact
    pub node_count: usize,

    /// Edge count reported by the cached artifact
    pub edge_count: usize,

    pub access_count: u64,

    pub last_accessed: DateTime<Utc>,

    /// False for entries flagged by `invalidate` but not yet reclaimed
    pub is_valid: bool,
}

/// Read-only snapshot of the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of resident entries (including flagged ones)
    pub size: usize,

    /// Configured capacity
    pub max_size: usize,

    /// One row per resident entry, ordered by key
    pub entries: Vec<EntryStats>,

    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses (including reads of flagged entries)
    pub misses: u64,

    /// Number of capacity-driven evictions
    pub evictions: u64,

    /// Number of entries dropped by invalidation
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Look up the diagnostics row for a key
    pub fn entry(&self, key: &str) -> Option<&EntryStats> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ size: {}/{}, hits: {}, misses: {}, hit_rate: {:.2}%, evictions: {}, invalidations: {} }}",
            self.size,
            self.max_size,
            self.hits,
            self.misses,
            self.hit_rate(),
            self.evictions,
            self.invalidations
        )
    }
}
