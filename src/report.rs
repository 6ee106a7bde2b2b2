use std::fmt;

use serde::Serialize;

use crate::connectivity::{analyze_connectivity, ConnectivityReport};
use crate::filter::FilteredGraph;
use crate::ingest::MentionData;
use crate::metrics::{
    adjacency, average_degree, clustering_coefficients, network_clustering, network_density,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCoefficient {
    pub node: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeMentions {
    pub node: String,
    pub mentions: u64,
}

/// Everything printed about a filtered graph.
///
/// Mention counts, node count and average degree cover the nodes that touch
/// at least one kept edge; the clustering mean and density cover every node
/// that survived the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReport {
    pub network_clustering: f64,
    /// Sorted by descending coefficient, ties by name.
    pub clustering: Vec<NodeCoefficient>,
    /// Sorted by descending count, ties by name.
    pub mentions: Vec<NodeMentions>,
    pub node_count: usize,
    pub edge_count: usize,
    pub average_degree: f64,
    pub density: f64,
    pub connectivity: Option<ConnectivityReport>,
}

impl NetworkReport {
    /// Run the metrics and connectivity passes over `graph` and collect the
    /// results.
    pub fn analyze(data: &MentionData, graph: &FilteredGraph) -> Self {
        let coefficients = clustering_coefficients(graph);
        let edges_by_node = adjacency(graph);

        let mut clustering: Vec<NodeCoefficient> = coefficients
            .iter()
            .map(|(node, &coefficient)| NodeCoefficient {
                node: node.clone(),
                coefficient,
            })
            .collect();
        clustering.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));

        let mut mentions: Vec<NodeMentions> = edges_by_node
            .keys()
            .map(|&node| NodeMentions {
                node: node.to_string(),
                mentions: data.mention_count(node),
            })
            .collect();
        mentions.sort_by(|a, b| b.mentions.cmp(&a.mentions));

        Self {
            network_clustering: network_clustering(&coefficients),
            clustering,
            node_count: mentions.len(),
            mentions,
            edge_count: graph.edges.len(),
            average_degree: average_degree(&edges_by_node),
            density: network_density(graph),
            connectivity: analyze_connectivity(graph),
        }
    }
}

impl fmt::Display for NetworkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Network clustering coefficient: {:.4}",
            self.network_clustering
        )?;
        writeln!(f, "Node clustering coefficients:")?;
        for entry in &self.clustering {
            writeln!(f, "{}: {:.4}", entry.node, entry.coefficient)?;
        }
        writeln!(f, "Node mentions:")?;
        for entry in &self.mentions {
            writeln!(f, "{}: {}", entry.node, entry.mentions)?;
        }
        writeln!(f, "Nodes: {}", self.node_count)?;
        writeln!(f, "Edges: {}", self.edge_count)?;
        writeln!(f, "Average degree: {:.4}", self.average_degree)?;
        writeln!(f, "Network density: {:.4}", self.density)?;
        match &self.connectivity {
            Some(ConnectivityReport::Connected {
                diameter,
                average_shortest_path,
            }) => {
                writeln!(f, "Diameter: {diameter}")?;
                writeln!(f, "Average shortest path length: {average_shortest_path:.4}")?;
            }
            Some(ConnectivityReport::Disconnected {
                average_reciprocal_path,
            }) => {
                writeln!(
                    f,
                    "Average reciprocal path length (disconnected graph): {average_reciprocal_path:.4}"
                )?;
            }
            None => {}
        }
        Ok(())
    }
}
