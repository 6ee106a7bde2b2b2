use std::path::PathBuf;

/// Errors raised while building or analysing the mention graph.
///
/// Malformed input lines and unreachable node pairs are not errors; they are
/// skipped where they occur.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A file could not be opened, read or written.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be decoded from the edge list.
    #[error("failed to read edge list: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV output file could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Filtering left too few edges for any metric to be meaningful.
    #[error(
        "filtering eliminated the graph: threshold {threshold} leaves {remaining_edges} edge(s), at least 2 are required"
    )]
    Degenerate {
        threshold: u64,
        remaining_edges: usize,
    },
}

impl GraphError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
