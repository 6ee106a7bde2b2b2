use std::collections::{BTreeSet, HashMap, VecDeque};

use petgraph::graphmap::UnGraphMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::FilteredGraph;

/// Path-length summary of the filtered graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityReport {
    Connected {
        diameter: usize,
        average_shortest_path: f64,
    },
    /// Mean over components of the mean reciprocal hop count inside each one.
    Disconnected { average_reciprocal_path: f64 },
}

/// Undirected simple view of the filtered edges: direction and multiplicity
/// are dropped.
fn undirected(graph: &FilteredGraph) -> UnGraphMap<&str, ()> {
    let mut view = UnGraphMap::new();
    for edge in &graph.edges {
        view.add_edge(edge.from.as_str(), edge.to.as_str(), ());
    }
    view
}

/// Breadth-first hop counts from `source` to every node it can reach.
fn hop_counts<'a>(view: &UnGraphMap<&'a str, ()>, source: &'a str) -> HashMap<&'a str, usize> {
    let mut distances = HashMap::from([(source, 0usize)]);
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        let next = distances[node] + 1;
        for neighbor in view.neighbors(node) {
            if !distances.contains_key(neighbor) {
                distances.insert(neighbor, next);
                queue.push_back(neighbor);
            }
        }
    }
    distances
}

fn components<'a>(view: &UnGraphMap<&'a str, ()>) -> Vec<BTreeSet<&'a str>> {
    let mut seen = BTreeSet::new();
    let mut components = Vec::new();
    for node in view.nodes() {
        if seen.contains(node) {
            continue;
        }
        let component: BTreeSet<&str> = hop_counts(view, node).into_keys().collect();
        seen.extend(component.iter().copied());
        components.push(component);
    }
    components
}

fn connected_summary(view: &UnGraphMap<&str, ()>) -> ConnectivityReport {
    let n = view.node_count();
    let mut diameter = 0usize;
    let mut total = 0usize;
    for node in view.nodes() {
        for (_, hops) in hop_counts(view, node) {
            diameter = diameter.max(hops);
            total += hops;
        }
    }

    let average_shortest_path = if n < 2 {
        0.0
    } else {
        total as f64 / (n * (n - 1)) as f64
    };
    ConnectivityReport::Connected {
        diameter,
        average_shortest_path,
    }
}

fn average_reciprocal_path<'a>(
    view: &UnGraphMap<&'a str, ()>,
    component: &BTreeSet<&'a str>,
) -> Option<f64> {
    let mut reciprocals = Vec::new();
    for &source in component {
        let distances = hop_counts(view, source);
        for &target in component {
            if source == target {
                continue;
            }
            // unreachable pairs contribute nothing
            if let Some(&hops) = distances.get(target) {
                reciprocals.push(1.0 / hops as f64);
            }
        }
    }

    if reciprocals.is_empty() {
        None
    } else {
        Some(reciprocals.iter().sum::<f64>() / reciprocals.len() as f64)
    }
}

/// Diameter and average shortest path when the graph is connected, or the
/// per-component reciprocal-path average when it is not.
///
/// Returns `None` when no component holds two distinct nodes.
pub fn analyze_connectivity(graph: &FilteredGraph) -> Option<ConnectivityReport> {
    let view = undirected(graph);
    let components = components(&view);

    if components.len() == 1 {
        let report = connected_summary(&view);
        info!(?report, "graph is connected");
        return Some(report);
    }

    let averages: Vec<f64> = components
        .iter()
        .filter_map(|component| average_reciprocal_path(&view, component))
        .collect();
    debug!(
        components = components.len(),
        contributing = averages.len(),
        "graph is disconnected"
    );

    if averages.is_empty() {
        return None;
    }
    let report = ConnectivityReport::Disconnected {
        average_reciprocal_path: averages.iter().sum::<f64>() / averages.len() as f64,
    };
    info!(?report, "computed reciprocal path fallback");
    Some(report)
}
