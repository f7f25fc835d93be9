//! Bulk load pipeline.
//!
//! Wires the paired-line reader and batch builder (a single producer on the
//! blocking pool) to a fixed pool of bulk senders through a bounded dispatch
//! queue, and funnels per-batch failures into a single aggregator.
//!
//! A run moves through three phases: producer and pool running, the producer
//! closing the queue once input is exhausted, and the pool draining its
//! in-flight batches. Completion is reached when the last sender exits.
//! Rejected bulk requests are reported along the way but never stop the run;
//! every fatal condition returns an error immediately instead.

mod tasks;

use std::sync::Arc;

use snafu::prelude::*;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::info;

use crate::config::Config;
use crate::error::{PipelineError, TaskJoinSnafu};
use crate::sink::{BulkFailure, BulkSender};
use crate::source::{Batch, ProgressSink};

use tasks::{ReadStats, produce_batches, run_aggregator, run_sender};

/// Receives per-batch failure reports while the run is in progress.
pub trait FailureSink: Send + Sync {
    fn report(&self, failure: &BulkFailure);
}

/// A failure sink that logs each report as an error.
pub struct LogFailures;

impl FailureSink for LogFailures {
    fn report(&self, failure: &BulkFailure) {
        tracing::error!("{failure}");
    }
}

/// Statistics about a completed load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadStats {
    /// Record pairs read from the dump.
    pub pairs_read: u64,
    /// Batches built and enqueued by the producer.
    pub batches_built: u64,
    /// Batches transmitted by the sender pool, rejected ones included.
    pub batches_posted: u64,
    /// Bulk requests rejected with a non-success status.
    pub failures: u64,
}

/// Run a bulk load to completion.
///
/// Fatal conditions (unreadable dump file, malformed input, an oversized
/// line, a transport-level request failure) abort the run with an error and
/// tear the pool down with the process. Rejected bulk requests only reach
/// the failure sink; a run that drains cleanly returns `Ok` no matter how
/// many of them there were.
pub async fn run_pipeline(
    config: Config,
    progress: Arc<dyn ProgressSink>,
    failures: Arc<dyn FailureSink>,
) -> Result<LoadStats, PipelineError> {
    config.validate()?;

    let sender = Arc::new(BulkSender::new(&config)?);

    // Queue capacity equals the pool size: once every sender is busy and the
    // queue is full, the producer blocks.
    let (batch_tx, batch_rx) = mpsc::channel::<Batch>(config.parallel);
    let (failure_tx, failure_rx) = mpsc::unbounded_channel();
    let queue = Arc::new(Mutex::new(batch_rx));

    let mut senders = JoinSet::new();
    for worker in 0..config.parallel {
        senders.spawn(run_sender(
            worker,
            queue.clone(),
            sender.clone(),
            failure_tx.clone(),
        ));
    }
    drop(failure_tx);
    let aggregator = tokio::spawn(run_aggregator(failure_rx, failures));
    info!(
        parallel = config.parallel,
        endpoint = %config.bulk_endpoint(),
        "sender pool started"
    );

    let dump_file = config.dump_file.clone();
    let bulk_size = config.bulk_size;
    let max_line_bytes = config.max_line_bytes;
    let mut producer = tokio::task::spawn_blocking(move || {
        produce_batches(dump_file, bulk_size, max_line_bytes, batch_tx, progress)
    });

    let mut read: Option<ReadStats> = None;
    let mut posted = 0u64;
    loop {
        tokio::select! {
            result = &mut producer, if read.is_none() => {
                let stats = result.context(TaskJoinSnafu)??;
                info!(batches = stats.batches, "input exhausted, draining in-flight batches");
                read = Some(stats);
            }
            next = senders.join_next() => match next {
                Some(result) => posted += result.context(TaskJoinSnafu)??,
                None => break,
            },
        }
    }

    // The pool can only drain after the producer dropped its queue handle,
    // so this join resolves immediately.
    let read = match read {
        Some(stats) => stats,
        None => producer.await.context(TaskJoinSnafu)??,
    };
    let failures = aggregator.await.context(TaskJoinSnafu)?;

    let stats = LoadStats {
        pairs_read: read.pairs,
        batches_built: read.batches,
        batches_posted: posted,
        failures,
    };
    info!(
        pairs = stats.pairs_read,
        batches = stats.batches_built,
        failures = stats.failures,
        "load complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_stats_default() {
        let stats = LoadStats::default();
        assert_eq!(stats.pairs_read, 0);
        assert_eq!(stats.failures, 0);
    }
}
