use std::collections::HashMap;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Graph};
use tracing::info;

use crate::error::GraphError;
use crate::filter::FilteredGraph;
use crate::ingest::MentionData;

pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search?q=";

// Viridis anchor colors at 0, 0.25, 0.5, 0.75 and 1
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

// Fills with any channel above this get dark text
const LIGHT_CHANNEL: u8 = 0xb2;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix for node and edge hyperlinks; the query is appended.
    pub search_url: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderNode {
    pub name: String,
    pub mentions: u64,
}

fn viridis(t: f64) -> (u8, u8, u8) {
    let scaled = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let low = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - low as f64;
    let (r0, g0, b0) = VIRIDIS[low];
    let (r1, g1, b1) = VIRIDIS[low + 1];
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    (mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

fn fill_colors(mentions: u64, max_mentions: u64) -> (String, &'static str) {
    let (r, g, b) = viridis(mentions as f64 / max_mentions.max(1) as f64);
    let font = if r > LIGHT_CHANNEL || g > LIGHT_CHANNEL || b > LIGHT_CHANNEL {
        "black"
    } else {
        "white"
    };
    (format!("#{r:02x}{g:02x}{b:02x}"), font)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn edge_link(search_url: &str, from: &str, to: &str) -> String {
    format!(
        "{search_url}{}-{}",
        urlencoding::encode(from),
        urlencoding::encode(to)
    )
}

fn node_link(search_url: &str, node: &str) -> String {
    format!("{search_url}{}", urlencoding::encode(&format!("\"{node}\"")))
}

/// Directed graph of the nodes touching kept edges, weighted by repetitions.
pub fn build_render_graph(
    data: &MentionData,
    graph: &FilteredGraph,
) -> Graph<RenderNode, u64, Directed> {
    let mut render = Graph::<RenderNode, u64, Directed>::new();
    let mut indices = HashMap::new();

    for node in graph.connected_nodes() {
        let index = render.add_node(RenderNode {
            name: node.to_string(),
            mentions: data.mention_count(node),
        });
        indices.insert(node, index);
    }

    for edge in &graph.edges {
        let penwidth = data.repetitions.get(edge).copied().unwrap_or(1);
        render.add_edge(
            indices[edge.from.as_str()],
            indices[edge.to.as_str()],
            penwidth,
        );
    }

    render
}

/// Graphviz source for the filtered graph.
///
/// Nodes are colored by mention count relative to the most mentioned node,
/// edge thickness follows the repetition count, and both carry search links.
pub fn to_dot(
    data: &MentionData,
    graph: &FilteredGraph,
    network_clustering: f64,
    options: &RenderOptions,
) -> String {
    let render = build_render_graph(data, graph);
    let max_mentions = render
        .raw_nodes()
        .iter()
        .map(|node| node.weight.mentions)
        .max()
        .unwrap_or(1);

    // the attribute closures borrow locals, so format before they drop
    let body = format!(
        "{:?}",
        Dot::with_attr_getters(
            &render,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|g, edge| {
                let link = edge_link(
                    &options.search_url,
                    &g[edge.source()].name,
                    &g[edge.target()].name,
                );
                format!(
                    "penwidth=\"{}\" URL=\"{}\" layer=\"back\"",
                    edge.weight(),
                    escape(&link),
                )
            },
            &|_, (_, node)| {
                let (fill, font) = fill_colors(node.mentions, max_mentions);
                format!(
                    "label=\"{}\" style=\"filled\" fillcolor=\"{fill}\" fontcolor=\"{font}\" href=\"{}\"",
                    escape(&node.name),
                    escape(&node_link(&options.search_url, &node.name)),
                )
            },
        )
    );

    let header = format!(
        "digraph {{\n    layout=fdp\n    rankdir=LR\n    label=\"network clustering coefficient: {network_clustering:.4}\"\n"
    );
    body.replacen("digraph {\n", &header, 1)
}

pub fn write_dot(path: &Path, dot: &str) -> Result<(), GraphError> {
    std::fs::write(path, dot).map_err(|e| GraphError::io(path, e))?;
    info!(path = %path.display(), "wrote graph render");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_graph;
    use crate::ingest::read_mentions;

    fn rendered(text: &str, threshold: u64) -> String {
        let data = read_mentions(text.as_bytes(), b';').unwrap();
        let graph = filter_graph(&data, threshold).unwrap();
        to_dot(&data, &graph, 0.5, &RenderOptions::default())
    }

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0.0), (68, 1, 84));
        assert_eq!(viridis(1.0), (253, 231, 37));
        assert_eq!(viridis(0.5), (33, 145, 140));
    }

    #[test]
    fn test_font_contrast() {
        assert_eq!(fill_colors(10, 10), ("#fde725".to_string(), "black"));
        assert_eq!(fill_colors(0, 10), ("#440154".to_string(), "white"));
    }

    #[test]
    fn test_render_graph_weights() {
        let data = read_mentions("a;b\na;b\nb;c\nc;a\nq;r\n".as_bytes(), b';').unwrap();
        let graph = filter_graph(&data, 1).unwrap();
        let render = build_render_graph(&data, &graph);

        assert_eq!(render.node_count(), 3);
        assert_eq!(render.edge_count(), 3);
        let mut weights: Vec<u64> = render.raw_edges().iter().map(|e| e.weight).collect();
        weights.sort_unstable();
        assert_eq!(weights, vec![1, 1, 2]);
    }

    #[test]
    fn test_dot_attributes() {
        let dot = rendered("New York;Boston\nnew york;boston\nboston;salem\nsalem;new york\n", 0);

        assert!(dot.starts_with("digraph {\n    layout=fdp\n    rankdir=LR\n"));
        assert!(dot.contains("label=\"network clustering coefficient: 0.5000\""));
        assert!(dot.contains("label=\"new york\""));
        assert!(dot.contains("href=\"https://www.google.com/search?q=%22new%20york%22\""));
        assert!(dot.contains("penwidth=\"2\" URL=\"https://www.google.com/search?q=new%20york-boston\""));
        assert!(dot.contains("->"));
    }

    #[test]
    fn test_links_percent_encode_reserved_characters() {
        let dot = rendered("r&d;c#\nc#;r&d\nr&d;50%\n50%;c#\n", 0);

        assert!(dot.contains("href=\"https://www.google.com/search?q=%22r%26d%22\""));
        assert!(dot.contains("URL=\"https://www.google.com/search?q=r%26d-c%23\""));
        assert!(dot.contains("URL=\"https://www.google.com/search?q=r%26d-50%25\""));
        assert!(!dot.contains("q=r&d"));
        // labels keep the raw name
        assert!(dot.contains("label=\"r&d\""));
    }

    #[test]
    fn test_links_encode_non_ascii_names() {
        let dot = rendered("Київ;Львів\nльвів;київ\n", 0);

        assert!(dot.contains("label=\"київ\""));
        assert!(!dot.contains("q=%22київ"));
        assert!(!dot.contains("q=київ"));
        assert_eq!(node_link("q=", "київ"), format!("q={}", urlencoding::encode("\"київ\"")));
    }

    #[test]
    fn test_write_dot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        let dot = rendered("a;b\nb;c\nc;a\n", 0);

        write_dot(&path, &dot).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), dot);
    }
}
