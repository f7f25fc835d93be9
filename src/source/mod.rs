//! Dump file source: paired-line reading, batching and progress reporting.

pub mod batch;
pub mod progress;
pub mod reader;

pub use batch::{Batch, BatchBuilder};
pub use progress::{NullProgress, ProgressReader, ProgressSink};
pub use reader::{PairReader, RecordPair};
