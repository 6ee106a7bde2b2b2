use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::GraphError;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
struct HistogramRow {
    mentions: u64,
    nodes: usize,
}

/// Frequency of each mention count above `threshold`: count -> number of nodes.
pub fn mention_histogram(mentions: &BTreeMap<String, u64>, threshold: u64) -> BTreeMap<u64, usize> {
    let mut histogram = BTreeMap::new();
    for &count in mentions.values().filter(|&&count| count > threshold) {
        *histogram.entry(count).or_insert(0) += 1;
    }
    histogram
}

pub fn write_histogram_csv(path: &Path, histogram: &BTreeMap<u64, usize>) -> Result<(), GraphError> {
    let write_error = |source| GraphError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    for (&mentions, &nodes) in histogram {
        writer
            .serialize(HistogramRow { mentions, nodes })
            .map_err(write_error)?;
    }
    writer.flush().map_err(|e| GraphError::io(path, e))?;
    info!(path = %path.display(), rows = histogram.len(), "wrote mention histogram");
    Ok(())
}

/// Horizontal text bar chart, one row per mention count.
pub fn render_bars(histogram: &BTreeMap<u64, usize>) -> String {
    let tallest = histogram.values().copied().max().unwrap_or(0);
    let label_width = histogram
        .keys()
        .map(|count| count.to_string().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (count, &nodes) in histogram {
        let bar = (nodes * BAR_WIDTH).div_ceil(tallest);
        let _ = writeln!(out, "{count:>label_width$} | {} {nodes}", "#".repeat(bar));
    }
    out
}
