use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::GraphError;

/// One directed mention relation between two normalized node names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Everything the ingest pass learns from the edge list.
///
/// The set of distinct edges is the key set of `repetitions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentionData {
    /// How often each node appears as an endpoint of a valid line.
    pub mentions: BTreeMap<String, u64>,
    /// How often each exact ordered pair appears.
    pub repetitions: BTreeMap<Edge, u64>,
}

impl MentionData {
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.repetitions.keys()
    }

    pub fn edge_count(&self) -> usize {
        self.repetitions.len()
    }

    pub fn mention_count(&self, node: &str) -> u64 {
        self.mentions.get(node).copied().unwrap_or(0)
    }

    fn record(mut self, from: String, to: String) -> Self {
        *self.mentions.entry(from.clone()).or_insert(0) += 1;
        *self.mentions.entry(to.clone()).or_insert(0) += 1;
        *self.repetitions.entry(Edge { from, to }).or_insert(0) += 1;
        self
    }
}

impl FromIterator<(String, String)> for MentionData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::default(), |data, (from, to)| data.record(from, to))
    }
}

pub fn normalize_node(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse `delimiter`-separated pairs from `reader`.
///
/// Lines that do not split into exactly two fields are skipped. There is no
/// header row and no quoting: fields are taken verbatim, then trimmed and
/// lowercased.
pub fn read_mentions<R: Read>(reader: R, delimiter: u8) -> Result<MentionData, GraphError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut skipped = 0usize;
    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != 2 {
            skipped += 1;
            debug!(fields = record.len(), "skipping malformed line");
            continue;
        }
        pairs.push((normalize_node(&record[0]), normalize_node(&record[1])));
    }

    let valid = pairs.len();
    let data: MentionData = pairs.into_iter().collect();
    info!(
        valid,
        skipped,
        nodes = data.mentions.len(),
        edges = data.edge_count(),
        "ingested edge list"
    );
    Ok(data)
}

pub fn read_mentions_from_path(path: &Path, delimiter: u8) -> Result<MentionData, GraphError> {
    let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
    read_mentions(file, delimiter)
}
