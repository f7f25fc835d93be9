//! Pipeline tasks: the batch producer, the sender workers and the failure
//! aggregator.

use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use snafu::prelude::*;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::error::{OpenDumpSnafu, PipelineError};
use crate::sink::{BulkFailure, BulkSender};
use crate::source::{Batch, BatchBuilder, PairReader, ProgressReader, ProgressSink};

use super::FailureSink;

/// Counts accumulated by the reader/batcher.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ReadStats {
    pub pairs: u64,
    pub batches: u64,
}

/// Read the dump, build batches and enqueue them in source order.
///
/// Runs on the blocking thread pool; `blocking_send` parks the producer
/// whenever every sender is busy and the queue is full, which is the
/// backpressure path. Dropping `queue` on return closes the dispatch queue.
pub(super) fn produce_batches(
    dump_file: PathBuf,
    bulk_size: usize,
    max_line_bytes: usize,
    queue: mpsc::Sender<Batch>,
    progress: Arc<dyn ProgressSink>,
) -> Result<ReadStats, PipelineError> {
    let file = std::fs::File::open(&dump_file).context(OpenDumpSnafu {
        path: dump_file.display().to_string(),
    })?;
    let mut reader = PairReader::new(
        BufReader::new(ProgressReader::new(file, progress)),
        max_line_bytes,
    );
    let mut builder = BatchBuilder::new(bulk_size);
    let mut stats = ReadStats::default();

    while let Some(pair) = reader.next_pair()? {
        stats.pairs += 1;
        if let Some(batch) = builder.push(&pair) {
            stats.batches += 1;
            queue
                .blocking_send(batch)
                .map_err(|_| PipelineError::QueueClosed)?;
        }
    }
    if let Some(batch) = builder.finish() {
        stats.batches += 1;
        queue
            .blocking_send(batch)
            .map_err(|_| PipelineError::QueueClosed)?;
    }

    debug!(pairs = stats.pairs, batches = stats.batches, "dump exhausted");
    Ok(stats)
}

/// One sender worker: dequeue a batch, transmit it, report, repeat.
///
/// Exits cleanly once the queue is closed and drained. A rejected bulk
/// request goes to the aggregator and the worker moves on; a transport
/// error is returned and aborts the whole run. Returns the number of
/// batches this worker transmitted.
pub(super) async fn run_sender(
    worker: usize,
    queue: Arc<Mutex<mpsc::Receiver<Batch>>>,
    sender: Arc<BulkSender>,
    failures: mpsc::UnboundedSender<BulkFailure>,
) -> Result<u64, PipelineError> {
    let mut posted = 0u64;
    loop {
        // Hold the queue lock only while dequeuing, never across a send.
        let batch = { queue.lock().await.recv().await };
        let Some(batch) = batch else {
            debug!(worker, posted, "queue closed and drained, sender exiting");
            return Ok(posted);
        };

        if let Some(failure) = sender.send(&batch).await? {
            // The aggregator outlives the pool; this can only fail during
            // teardown after a fatal error elsewhere.
            let _ = failures.send(failure);
        }
        posted += 1;
    }
}

/// Collect failure reports from all senders and forward them to the error
/// sink as they arrive. Ends once every sender has dropped its handle.
/// Returns the number of failures seen.
pub(super) async fn run_aggregator(
    mut failures: mpsc::UnboundedReceiver<BulkFailure>,
    sink: Arc<dyn FailureSink>,
) -> u64 {
    let mut count = 0u64;
    while let Some(failure) = failures.recv().await {
        count += 1;
        sink.report(&failure);
    }
    count
}
