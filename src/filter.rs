use std::collections::BTreeSet;

use tracing::info;

use crate::error::GraphError;
use crate::ingest::{Edge, MentionData};

/// Smallest edge count a filtered graph may keep.
pub const MIN_EDGES: usize = 2;

/// Nodes mentioned more often than the threshold, and the edges between them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredGraph {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<Edge>,
}

impl FilteredGraph {
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&Edge::new(from, to))
    }

    /// Nodes that appear as an endpoint of at least one kept edge.
    pub fn connected_nodes(&self) -> BTreeSet<&str> {
        self.edges
            .iter()
            .flat_map(|edge| [edge.from.as_str(), edge.to.as_str()])
            .collect()
    }
}

/// Keep nodes whose mention count is strictly greater than `threshold`.
///
/// Fails with [`GraphError::Degenerate`] when fewer than two edges survive.
pub fn filter_graph(data: &MentionData, threshold: u64) -> Result<FilteredGraph, GraphError> {
    let nodes: BTreeSet<String> = data
        .mentions
        .iter()
        .filter(|(_, &count)| count > threshold)
        .map(|(node, _)| node.clone())
        .collect();

    let edges: BTreeSet<Edge> = data
        .edges()
        .filter(|edge| nodes.contains(&edge.from) && nodes.contains(&edge.to))
        .cloned()
        .collect();

    if edges.len() < MIN_EDGES {
        return Err(GraphError::Degenerate {
            threshold,
            remaining_edges: edges.len(),
        });
    }

    info!(
        threshold,
        nodes = nodes.len(),
        edges = edges.len(),
        "filtered graph"
    );
    Ok(FilteredGraph { nodes, edges })
}
