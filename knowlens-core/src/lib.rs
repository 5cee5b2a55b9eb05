//! # knowlens-core
//!
//! Client-side state coordination for a knowledge graph browser panel.
//!
//! ## Features
//!
//! - Capacity-bounded layout cache with true LRU eviction
//! - Lazy invalidation: flagged entries are reclaimed on the next read
//! - Streaming extraction coordinator with correlation-ID discipline
//! - Field-level last-writer-wins merging of partial results
//! - Bounded index-status polling with exponential backoff
//!
//! ## Layout Cache
//!
//! ```no_run
//! use knowlens_core::{CacheConfig, GraphCacheManager, GraphLayout};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> knowlens_core::Result<()> {
//!     let cache: Arc<GraphCacheManager<GraphLayout>> =
//!         Arc::new(GraphCacheManager::new(CacheConfig::from_env()?));
//!
//!     cache.set("graph:abc", GraphLayout::new(vec![], vec![], 5)).await;
//!
//!     if let Some(layout) = cache.get("graph:abc").await {
//!         println!("cached layout with {} nodes", layout.metadata.node_count);
//!     }
//!
//!     println!("{}", cache.stats().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming Extraction
//!
//! See [`extraction`] for the coordinator and its message contract.

pub mod cache;
pub mod error;
pub mod extraction;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheStats, EntryStats, GraphCacheManager, GraphLayout,
    LayoutArtifact, LayoutKeyBuilder,
};
pub use error::{KnowlensError, Result};
pub use extraction::{
    CoordinatorConfig, ExtractionId, ExtractionMessage, ExtractionMode, ExtractionObserver,
    ExtractionOutcome, ExtractionService, KnowledgeSnapshot, Phase, ProgressEvent,
    StreamingExtractionCoordinator,
};
