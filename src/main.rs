//! hail: a parallel bulk loader for newline-delimited Elasticsearch dumps.
//!
//! Streams a dump of alternating action/metadata and document lines, groups
//! record pairs into batches and POSTs them to `{url}/{index}/_bulk` from a
//! bounded pool of concurrent senders, drawing a byte progress bar while
//! the load runs.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use snafu::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hail::config::{self, Config, DEFAULT_BULK_SIZE};
use hail::error::{DumpMetadataSnafu, PipelineError};
use hail::pipeline::{LogFailures, run_pipeline};
use hail::source::ProgressSink;

/// NDJSON dump to Elasticsearch bulk loader.
#[derive(Parser, Debug)]
#[command(name = "hail")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dump file in NDJSON format (alternating metadata and document lines).
    #[arg(long)]
    dump_file: PathBuf,

    /// Destination base URL, eg: http://localhost:9200.
    #[arg(long)]
    url: String,

    /// Destination index.
    #[arg(long)]
    index: String,

    /// Log successful bulk response bodies.
    #[arg(long)]
    verbose: bool,

    /// Number of record pairs in each bulk request.
    #[arg(long, default_value_t = DEFAULT_BULK_SIZE)]
    bulk_size: usize,

    /// Number of parallel bulk posts.
    #[arg(long, default_value_t = config::default_parallelism())]
    parallel: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Drives the console progress bar from the pipeline's byte counter.
struct BarProgress(ProgressBar);

impl ProgressSink for BarProgress {
    fn consumed(&self, total_bytes: u64) {
        self.0.set_position(total_bytes);
    }
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::new(args.dump_file, args.url, args.index)
        .with_verbose(args.verbose)
        .with_bulk_size(args.bulk_size)
        .with_parallel(args.parallel);
    config.validate()?;

    let dump_size = std::fs::metadata(&config.dump_file)
        .context(DumpMetadataSnafu {
            path: config.dump_file.display().to_string(),
        })?
        .len();

    let bar = ProgressBar::new(dump_size);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let stats = run_pipeline(
        config,
        Arc::new(BarProgress(bar.clone())),
        Arc::new(LogFailures),
    )
    .await?;
    bar.finish();

    info!("Load completed");
    info!("  Pairs read: {}", stats.pairs_read);
    info!("  Batches sent: {}", stats.batches_posted);
    info!("  Failures reported: {}", stats.failures);

    Ok(())
}
