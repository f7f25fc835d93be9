//! Error types for the hail bulk loader.

use snafu::prelude::*;

/// Errors from validating the loader configuration.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Bulk size must be at least one pair per batch.
    #[snafu(display("bulk-size must be at least 1"))]
    ZeroBulkSize,

    /// Parallelism must be at least one sender.
    #[snafu(display("parallel must be at least 1"))]
    ZeroParallelism,

    /// Destination URL is empty.
    #[snafu(display("url must not be empty"))]
    EmptyUrl,

    /// Destination index is empty.
    #[snafu(display("index must not be empty"))]
    EmptyIndex,
}

/// Errors from reading and pairing lines of the dump file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ReaderError {
    /// A single line exceeded the configured maximum size.
    #[snafu(display("line {line} exceeds the maximum line size of {limit} bytes"))]
    LineTooLong { line: u64, limit: usize },

    /// The dump ended on an unpaired metadata line.
    #[snafu(display(
        "malformed dump: odd number of lines ({lines}), trailing metadata line has no document"
    ))]
    MalformedDump { lines: u64 },

    /// Failed to read from the dump file.
    #[snafu(display("failed to read dump: {source}"))]
    Read { source: std::io::Error },
}

/// Top-level errors for a bulk load run. All of these are fatal.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// Configuration error.
    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },

    /// Failed to open the dump file.
    #[snafu(display("failed to open dump file {path}: {source}"))]
    OpenDump {
        path: String,
        source: std::io::Error,
    },

    /// Failed to stat the dump file.
    #[snafu(display("failed to stat dump file {path}: {source}"))]
    DumpMetadata {
        path: String,
        source: std::io::Error,
    },

    /// Reader error.
    #[snafu(display("reader error: {source}"))]
    Reader { source: ReaderError },

    /// Failed to build the HTTP client.
    #[snafu(display("failed to build HTTP client: {source}"))]
    HttpClient { source: reqwest::Error },

    /// A bulk request could not be transmitted at all.
    #[snafu(display("bulk request transport failure: {source}"))]
    Transport { source: reqwest::Error },

    /// Task join error.
    #[snafu(display("task join error: {source}"))]
    TaskJoin { source: tokio::task::JoinError },

    /// The dispatch queue closed while batches were still being produced.
    #[snafu(display("dispatch queue closed before all batches were enqueued"))]
    QueueClosed,
}

impl From<ConfigError> for PipelineError {
    fn from(source: ConfigError) -> Self {
        PipelineError::Config { source }
    }
}

impl From<ReaderError> for PipelineError {
    fn from(source: ReaderError) -> Self {
        PipelineError::Reader { source }
    }
}
