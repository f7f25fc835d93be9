//! Loader configuration.
//!
//! Holds the flag-driven configuration record consumed by the pipeline:
//! source path, destination endpoint, target index, batch size and
//! parallelism. Validation guards the invariants the pipeline relies on.

use snafu::prelude::*;
use std::path::PathBuf;

use crate::error::{
    ConfigError, EmptyIndexSnafu, EmptyUrlSnafu, ZeroBulkSizeSnafu, ZeroParallelismSnafu,
};

/// Byte size constants (binary/IEC units).
pub const KB: usize = 1024;
pub const MB: usize = 1024 * KB;

/// Default number of record pairs per bulk request.
pub const DEFAULT_BULK_SIZE: usize = 1000;

/// Default maximum size of a single dump line.
pub const DEFAULT_MAX_LINE_BYTES: usize = MB;

/// Configuration for a bulk load run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the dump file (NDJSON, alternating metadata and document lines).
    pub dump_file: PathBuf,

    /// Base URL of the destination service, e.g. "http://localhost:9200".
    pub url: String,

    /// Destination index name.
    pub index: String,

    /// Log successful bulk response bodies.
    pub verbose: bool,

    /// Number of record pairs per bulk request.
    pub bulk_size: usize,

    /// Number of concurrent bulk senders; also the dispatch queue capacity.
    pub parallel: usize,

    /// Maximum size of a single dump line in bytes.
    pub max_line_bytes: usize,
}

impl Config {
    /// Create a configuration with default batching and parallelism.
    pub fn new(
        dump_file: impl Into<PathBuf>,
        url: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            dump_file: dump_file.into(),
            url: url.into(),
            index: index.into(),
            verbose: false,
            bulk_size: DEFAULT_BULK_SIZE,
            parallel: default_parallelism(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Set the number of record pairs per bulk request.
    pub fn with_bulk_size(mut self, bulk_size: usize) -> Self {
        self.bulk_size = bulk_size;
        self
    }

    /// Set the number of concurrent bulk senders.
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable verbose response logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the maximum size of a single dump line.
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(self.bulk_size >= 1, ZeroBulkSizeSnafu);
        ensure!(self.parallel >= 1, ZeroParallelismSnafu);
        ensure!(!self.url.is_empty(), EmptyUrlSnafu);
        ensure!(!self.index.is_empty(), EmptyIndexSnafu);
        Ok(())
    }

    /// Full URL of the destination bulk endpoint.
    pub fn bulk_endpoint(&self) -> String {
        format!("{}/{}/_bulk", self.url.trim_end_matches('/'), self.index)
    }
}

/// Default sender parallelism: one per available processing unit.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("dump.ndjson", "http://localhost:9200", "logs");
        assert_eq!(config.bulk_size, DEFAULT_BULK_SIZE);
        assert_eq!(config.max_line_bytes, MB);
        assert!(config.parallel >= 1);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bulk_endpoint() {
        let config = Config::new("dump.ndjson", "http://localhost:9200", "logs");
        assert_eq!(config.bulk_endpoint(), "http://localhost:9200/logs/_bulk");
    }

    #[test]
    fn test_bulk_endpoint_trailing_slash() {
        let config = Config::new("dump.ndjson", "http://localhost:9200/", "logs");
        assert_eq!(config.bulk_endpoint(), "http://localhost:9200/logs/_bulk");
    }

    #[test]
    fn test_zero_bulk_size_rejected() {
        let config = Config::new("dump.ndjson", "http://localhost:9200", "logs").with_bulk_size(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroBulkSize { .. })
        ));
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let config = Config::new("dump.ndjson", "http://localhost:9200", "logs").with_parallel(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroParallelism { .. })
        ));
    }

    #[test]
    fn test_empty_url_rejected() {
        let config = Config::new("dump.ndjson", "", "logs");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyUrl { .. })));
    }

    #[test]
    fn test_empty_index_rejected() {
        let config = Config::new("dump.ndjson", "http://localhost:9200", "");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyIndex { .. })
        ));
    }
}
