mod connectivity;
mod error;
mod filter;
mod histogram;
mod ingest;
mod metrics;
mod render;
mod report;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::filter::filter_graph;
use crate::histogram::{mention_histogram, render_bars, write_histogram_csv};
use crate::ingest::read_mentions_from_path;
use crate::render::{to_dot, write_dot, RenderOptions, DEFAULT_SEARCH_URL};
use crate::report::NetworkReport;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "comention: co-mention graph filtering and structural metrics",
    long_about = None
)]
struct Cli {
    /// Edge list with one `from<delimiter>to` pair per line.
    #[arg(default_value = "data.txt")]
    input: PathBuf,

    /// Field delimiter (a single ASCII character).
    #[arg(short, long, default_value = ";", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Keep nodes mentioned more than this many times.
    #[arg(short, long, default_value_t = 2)]
    threshold: u64,

    /// Where to write the Graphviz render.
    #[arg(long, default_value = "output_graph.dot")]
    dot: PathBuf,

    /// Skip writing the Graphviz render.
    #[arg(long)]
    no_render: bool,

    /// Also write the mention-count histogram as CSV.
    #[arg(long)]
    histogram: Option<PathBuf>,

    /// Base URL for node and edge search links.
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    search_url: String,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("expected a single ASCII character, got {raw:?}")),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("COMENTION_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "comention=debug,info"
        } else {
            "comention=info,warn"
        })
    });

    let format = env::var("COMENTION_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data = read_mentions_from_path(&cli.input, cli.delimiter)
        .with_context(|| format!("failed to load edge list {}", cli.input.display()))?;
    let graph = filter_graph(&data, cli.threshold)?;

    let histogram = mention_histogram(&data.mentions, cli.threshold);
    if let Some(path) = &cli.histogram {
        write_histogram_csv(path, &histogram)?;
    }

    let report = NetworkReport::analyze(&data, &graph);

    if !cli.no_render {
        let options = RenderOptions {
            search_url: cli.search_url.clone(),
        };
        let dot = to_dot(&data, &graph, report.network_clustering, &options);
        write_dot(&cli.dot, &dot)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Mention count histogram (threshold {}):", cli.threshold);
        print!("{}", render_bars(&histogram));
        print!("{report}");
    }

    info!(
        nodes = report.node_count,
        edges = report.edge_count,
        "analysis complete"
    );
    Ok(())
}
