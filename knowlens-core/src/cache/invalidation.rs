//! Reasons an entry leaves the cache

use serde::{Deserialize, Serialize};

/// Why a resident entry was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// A read found the entry flagged by `invalidate` and reclaimed it
    StaleRead,

    /// Flagged and dropped by `invalidate_all`
    InvalidateAll,

    /// Dropped by `clear`
    Cleared,

    /// Evicted to make room for a new key
    LeastRecentlyUsed,
}

impl InvalidationReason {
    /// Whether this removal counts as an eviction rather than an invalidation
    pub fn is_eviction(&self) -> bool {
        matches!(self, InvalidationReason::LeastRecentlyUsed)
    }
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidationReason::StaleRead => write!(f, "invalidated entry reclaimed on read"),
            InvalidationReason::InvalidateAll => write!(f, "invalidate all"),
            InvalidationReason::Cleared => write!(f, "cleared"),
            InvalidationReason::LeastRecentlyUsed => write!(f, "LRU eviction"),
        }
    }
}
