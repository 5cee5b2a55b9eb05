//! Layout artifacts stored by the cache
//!
//! The cache is generic over anything implementing [`LayoutArtifact`];
//! [`GraphLayout`] is the concrete artifact produced by the force layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal capability the cache needs from a stored artifact
pub trait LayoutArtifact {
    /// Number of laid-out nodes
    fn node_count(&self) -> usize;

    /// Number of laid-out edges
    fn edge_count(&self) -> usize;
}

/// A positioned node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    /// Community assigned by clustering, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<u32>,
}

/// An edge between two positioned nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Metadata derived while computing a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    pub node_count: usize,
    pub edge_count: usize,
    pub community_count: usize,
    pub layout_duration_ms: u64,
    pub average_spacing: f64,
    pub computed_at: DateTime<Utc>,
}

/// A computed graph layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub metadata: LayoutMetadata,
}

impl GraphLayout {
    /// Build a layout and derive its metadata from the positioned nodes
    pub fn new(nodes: Vec<LayoutNode>, edges: Vec<LayoutEdge>, layout_duration_ms: u64) -> Self {
        let mut communities: Vec<u32> = nodes.iter().filter_map(|n| n.community).collect();
        communities.sort_unstable();
        communities.dedup();

        let metadata = LayoutMetadata {
            node_count: nodes.len(),
            edge_count: edges.len(),
            community_count: communities.len(),
            layout_duration_ms,
            average_spacing: average_spacing(&nodes),
            computed_at: Utc::now(),
        };

        Self {
            nodes,
            edges,
            metadata,
        }
    }
}

impl LayoutArtifact for GraphLayout {
    fn node_count(&self) -> usize {
        self.metadata.node_count
    }

    fn edge_count(&self) -> usize {
        self.metadata.edge_count
    }
}

/// Mean distance from each node to its nearest neighbour
fn average_spacing(nodes: &[LayoutNode]) -> f64 {
    if nodes.len() < 2 {
        return 0.0;
    }

    let total: f64 = nodes
        .iter()
        .enumerate()
        .map(|(i, a)| {
            nodes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt())
                .fold(f64::INFINITY, f64::min)
        })
        .sum();

    total / nodes.len() as f64
}
