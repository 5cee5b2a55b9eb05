//! # Graph Layout Cache
//!
//! An in-memory, capacity-bounded memoization layer for expensive graph
//! layout computations.
//!
//! ## Features
//!
//! - **LRU Eviction**: the entry with the oldest access is evicted when a new key
//!   arrives at a full cache
//! - **Lazy Invalidation**: `invalidate` only flags an entry; the next read drops it
//! - **Artifact-Agnostic**: generic over any [`LayoutArtifact`]
//! - **Diagnostics**: per-entry access counts and hit/miss counters via `stats`
//!
//! ## Example
//!
//! ```rust
//! use knowlens_core::cache::{GraphCacheManager, GraphLayout, LayoutKeyBuilder};
//!
//! # async fn example() {
//! let cache = GraphCacheManager::with_capacity(50);
//!
//! let key = LayoutKeyBuilder::new("example.com")
//!     .content("entity graph v1")
//!     .param("algorithm", "force")
//!     .build();
//!
//! let layout = cache
//!     .get_or_insert_with(&key, || async { GraphLayout::new(vec![], vec![], 0) })
//!     .await;
//! println!("{} nodes", layout.metadata.node_count);
//! # }
//! ```

pub mod artifact;
pub mod config;
pub mod entry;
pub mod invalidation;
pub mod key;
pub mod store;
pub mod types;

pub use artifact::{GraphLayout, LayoutArtifact, LayoutEdge, LayoutMetadata, LayoutNode};
pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::{CacheEntry, CacheMetadata};
pub use invalidation::InvalidationReason;
pub use key::LayoutKeyBuilder;
pub use store::GraphCacheManager;
pub use types::{CacheKey, CacheStats, EntryStats};
