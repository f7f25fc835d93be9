//! hail: a parallel bulk loader for newline-delimited Elasticsearch dumps.
//!
//! This library streams a dump of alternating action/metadata and document
//! lines, groups record pairs into fixed-size batches, and POSTs them to an
//! index's `_bulk` endpoint from a bounded pool of concurrent senders.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hail::{Config, run_pipeline, LogFailures, error::PipelineError};
//! use hail::source::NullProgress;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PipelineError> {
//!     let config = Config::new("dump.ndjson", "http://localhost:9200", "logs");
//!     let stats = run_pipeline(config, Arc::new(NullProgress), Arc::new(LogFailures)).await?;
//!     println!("loaded {} pairs", stats.pairs_read);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;

// Re-export main types
pub use config::Config;
pub use pipeline::{FailureSink, LoadStats, LogFailures, run_pipeline};
pub use sink::BulkFailure;
pub use source::ProgressSink;
