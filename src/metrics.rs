use std::collections::BTreeMap;

use tracing::debug;

use crate::filter::FilteredGraph;

/// Neighbor occurrences of every node: one entry per edge touching it.
///
/// A neighbor reached through several edges (say `a -> b` and `b -> a`) is
/// listed once per edge. A self-loop lists the node itself once.
fn neighbor_occurrences(graph: &FilteredGraph) -> BTreeMap<&str, Vec<&str>> {
    let mut occurrences: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for edge in &graph.edges {
        occurrences.entry(&edge.from).or_default().push(&edge.to);
        if edge.from != edge.to {
            occurrences.entry(&edge.to).or_default().push(&edge.from);
        }
    }
    occurrences
}

// Function to calculate the clustering coefficient of one node from its neighbor list
fn clustering_coefficient(graph: &FilteredGraph, neighbors: &[&str]) -> f64 {
    if neighbors.len() < 2 {
        return 0.0;
    }

    let mut closed_pairs = 0usize;
    for (i, &ni) in neighbors.iter().enumerate() {
        for &nj in &neighbors[i + 1..] {
            if graph.contains_edge(ni, nj) || graph.contains_edge(nj, ni) {
                closed_pairs += 1;
            }
        }
    }

    let k = neighbors.len();
    2.0 * closed_pairs as f64 / (k * (k - 1)) as f64
}

/// Clustering coefficient of every node of the filtered graph.
///
/// Pairs are taken over positions in the neighbor-occurrence list rather
/// than over distinct neighbors, so repeated neighbors add both to the
/// denominator and to the chances of closure.
pub fn clustering_coefficients(graph: &FilteredGraph) -> BTreeMap<String, f64> {
    let occurrences = neighbor_occurrences(graph);
    graph
        .nodes
        .iter()
        .map(|node| {
            let neighbors = occurrences
                .get(node.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            (node.clone(), clustering_coefficient(graph, neighbors))
        })
        .collect()
}

/// Mean of the per-node coefficients over all filtered nodes.
pub fn network_clustering(coefficients: &BTreeMap<String, f64>) -> f64 {
    if coefficients.is_empty() {
        return 0.0;
    }
    coefficients.values().sum::<f64>() / coefficients.len() as f64
}

/// Edge count over the number of unordered node pairs.
///
/// Directed edges are stored separately, so a graph holding both `a -> b`
/// and `b -> a` can exceed 1.0.
pub fn network_density(graph: &FilteredGraph) -> f64 {
    let n = graph.nodes.len();
    if n < 2 {
        return 0.0;
    }
    let possible_edges = (n * (n - 1)) as f64 / 2.0;
    graph.edges.len() as f64 / possible_edges
}

/// Incident-edge lists keyed by node, built while enumerating the edges.
///
/// Each edge is appended to the lists of both endpoints, so a self-loop
/// lands twice in the same list.
pub fn adjacency(graph: &FilteredGraph) -> BTreeMap<&str, Vec<&str>> {
    let mut edges_by_node: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for edge in &graph.edges {
        edges_by_node.entry(&edge.from).or_default().push(&edge.to);
        edges_by_node.entry(&edge.to).or_default().push(&edge.from);
    }
    edges_by_node
}

pub fn average_degree(edges_by_node: &BTreeMap<&str, Vec<&str>>) -> f64 {
    if edges_by_node.is_empty() {
        return 0.0;
    }
    let total: usize = edges_by_node.values().map(Vec::len).sum();
    let average = total as f64 / edges_by_node.len() as f64;
    debug!(nodes = edges_by_node.len(), total, average, "computed average degree");
    average
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Edge;
    use proptest::prelude::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> FilteredGraph {
        FilteredGraph {
            nodes: nodes.iter().map(|n| n.to_string()).collect(),
            edges: edges.iter().map(|(a, b)| Edge::new(*a, *b)).collect(),
        }
    }

    #[test]
    fn test_triangle_is_fully_clustered() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let coefficients = clustering_coefficients(&g);

        for node in ["a", "b", "c"] {
            assert_eq!(coefficients[node], 1.0);
        }
        assert_eq!(network_clustering(&coefficients), 1.0);
    }

    #[test]
    fn test_star_has_no_clustering() {
        let g = graph(
            &["hub", "x", "y", "z"],
            &[("hub", "x"), ("hub", "y"), ("z", "hub")],
        );
        let coefficients = clustering_coefficients(&g);

        assert_eq!(coefficients["hub"], 0.0);
        // leaves see a single neighbor
        assert_eq!(coefficients["x"], 0.0);
        assert_eq!(network_clustering(&coefficients), 0.0);
    }

    #[test]
    fn test_repeated_neighbor_counts_per_occurrence() {
        // a sees [b, b, c]: the pairs (b, c) close twice, (b, b) never
        let g = graph(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "a"), ("b", "c"), ("a", "c")],
        );
        let coefficients = clustering_coefficients(&g);

        assert_eq!(coefficients["a"], 2.0 * 2.0 / 6.0);
        // c sees [b, a] and b -> a closes it
        assert_eq!(coefficients["c"], 1.0);
    }

    #[test]
    fn test_incoming_edges_contribute_their_source() {
        // v only receives edges; its neighbors are the sources x and y
        let g = graph(&["v", "x", "y"], &[("x", "v"), ("y", "v"), ("x", "y")]);
        let coefficients = clustering_coefficients(&g);

        assert_eq!(neighbor_occurrences(&g)["v"], vec!["x", "y"]);
        assert_eq!(coefficients["v"], 1.0);
    }

    #[test]
    fn test_isolated_survivor_counts_in_mean() {
        let g = graph(
            &["a", "b", "c", "lonely"],
            &[("a", "b"), ("b", "c"), ("c", "a")],
        );
        let coefficients = clustering_coefficients(&g);

        assert_eq!(coefficients["lonely"], 0.0);
        assert_eq!(network_clustering(&coefficients), 0.75);
    }

    #[test]
    fn test_density_of_path() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);

        assert_eq!(network_density(&g), 0.5);
    }

    #[test]
    fn test_density_counts_both_directions() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);

        assert_eq!(network_density(&g), 2.0);
    }

    #[test]
    fn test_average_degree_triangle() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);

        assert_eq!(average_degree(&adjacency(&g)), 2.0);
    }

    #[test]
    fn test_self_loop_counts_twice_in_degree() {
        let g = graph(&["a", "b"], &[("a", "a"), ("a", "b")]);
        let edges_by_node = adjacency(&g);

        assert_eq!(edges_by_node["a"], vec!["a", "a", "b"]);
        assert_eq!(edges_by_node["b"], vec!["a"]);
        assert_eq!(average_degree(&edges_by_node), 2.0);
    }

    #[test]
    fn test_self_loop_is_single_neighbor_occurrence() {
        // a sees [a, b]; the pair closes through a -> b
        let g = graph(&["a", "b"], &[("a", "a"), ("a", "b")]);
        let coefficients = clustering_coefficients(&g);

        assert_eq!(coefficients["a"], 1.0);
        assert_eq!(coefficients["b"], 0.0);
    }

    proptest! {
        #[test]
        fn coefficients_stay_in_unit_interval(
            pairs in prop::collection::vec((0u8..6, 0u8..6), 2..30)
        ) {
            let g = FilteredGraph {
                nodes: pairs.iter().flat_map(|(a, b)| [format!("n{a}"), format!("n{b}")]).collect(),
                edges: pairs.iter().map(|(a, b)| Edge::new(format!("n{a}"), format!("n{b}"))).collect(),
            };
            let coefficients = clustering_coefficients(&g);
            let occurrences = neighbor_occurrences(&g);

            for (node, &c) in &coefficients {
                prop_assert!((0.0..=1.0).contains(&c));
                let k = occurrences.get(node.as_str()).map_or(0, Vec::len);
                if k < 2 {
                    prop_assert_eq!(c, 0.0);
                }
            }
            let mean = network_clustering(&coefficients);
            prop_assert!((0.0..=1.0).contains(&mean));
        }
    }
}
