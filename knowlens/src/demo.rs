//! Synthetic workload for the layout cache

use knowlens_core::cache::{
    CacheConfig, CacheStats, GraphCacheManager, GraphLayout, LayoutEdge, LayoutKeyBuilder,
    LayoutNode,
};
use tracing::info;

/// Ring-shaped layout with `nodes` nodes
pub fn ring_layout(nodes: usize) -> GraphLayout {
    let radius = 40.0 * nodes.max(1) as f64;
    let layout_nodes: Vec<LayoutNode> = (0..nodes)
        .map(|i| {
            let angle = i as f64 / nodes as f64 * std::f64::consts::TAU;
            LayoutNode {
                id: format!("n{}", i),
                label: format!("Node {}", i),
                x: radius * angle.cos(),
                y: radius * angle.sin(),
                community: Some((i % 3) as u32),
            }
        })
        .collect();

    let edges = (0..nodes)
        .filter(|_| nodes > 1)
        .map(|i| LayoutEdge {
            source: format!("n{}", i),
            target: format!("n{}", (i + 1) % nodes),
            label: None,
        })
        .collect();

    GraphLayout::new(layout_nodes, edges, nodes as u64)
}

/// Fill a cache of `size` slots past capacity, touch the oldest entries,
/// invalidate one and return the resulting stats
pub async fn run_cache_demo(config: CacheConfig) -> CacheStats {
    let size = config.max_cache_size;
    let cache: GraphCacheManager<GraphLayout> = GraphCacheManager::new(config);

    let keys: Vec<String> = (0..size + size / 2 + 1)
        .map(|i| {
            LayoutKeyBuilder::new("demo")
                .content(&i)
                .param("algorithm", "ring")
                .build()
        })
        .collect();

    for (i, key) in keys.iter().enumerate() {
        cache
            .get_or_insert_with(key, || async move { ring_layout(i % 12 + 2) })
            .await;

        // Keep the first key hot so it survives eviction
        if i % 4 == 0 {
            cache.get(&keys[0]).await;
        }
    }

    if let Some(last) = keys.last() {
        cache.invalidate(last).await;
        cache.get(last).await;
    }

    let stats = cache.stats().await;
    info!(
        "Cache demo finished: {}/{} entries, hit rate {:.2}",
        stats.size,
        stats.max_size,
        stats.hit_rate()
    );
    stats
}
