//! Bulk endpoint sender.
//!
//! Performs one `POST {url}/{index}/_bulk` per batch with an NDJSON body.
//! Only the response status is inspected: 200 is success, anything else
//! becomes a reportable failure carrying the verbatim response body. An
//! error transmitting the request at all is fatal for the whole run.

use std::fmt;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{HttpClientSnafu, PipelineError, TransportSnafu};
use crate::source::Batch;

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// A bulk request that was transmitted but rejected by the service.
///
/// Reported and non-fatal: the run continues past it.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    /// Sequence number of the offending batch.
    pub batch: u64,
    /// Response status.
    pub status: StatusCode,
    /// Verbatim response body.
    pub body: String,
}

impl fmt::Display for BulkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bulk request {} failed: {}, response: {}",
            self.batch, self.status, self.body
        )
    }
}

/// Sends batches to the destination bulk endpoint.
pub struct BulkSender {
    client: reqwest::Client,
    endpoint: String,
    verbose: bool,
}

impl BulkSender {
    /// Build a sender for the configured destination.
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder().build().context(HttpClientSnafu)?;
        Ok(Self {
            client,
            endpoint: config.bulk_endpoint(),
            verbose: config.verbose,
        })
    }

    /// Transmit one batch.
    ///
    /// Returns `Ok(None)` on success, `Ok(Some(failure))` on a non-success
    /// status, and `Err` on a transport-level failure.
    pub async fn send(&self, batch: &Batch) -> Result<Option<BulkFailure>, PipelineError> {
        debug!(batch = batch.seq, pairs = batch.pairs, "posting bulk request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(batch.body.clone())
            .send()
            .await
            .context(TransportSnafu)?;

        let status = response.status();
        // A body that cannot be read is reported as empty, matching the
        // best-effort treatment of response bodies everywhere else.
        if status == StatusCode::OK {
            if self.verbose {
                let body = response.text().await.unwrap_or_default();
                info!(batch = batch.seq, "bulk response: {body}");
            }
            return Ok(None);
        }

        let body = response.text().await.unwrap_or_default();
        Ok(Some(BulkFailure {
            batch: batch.seq,
            status,
            body,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_carries_status_and_body() {
        let failure = BulkFailure {
            batch: 7,
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "{\"error\":\"rate limited\"}".to_string(),
        };
        let text = failure.to_string();
        assert!(text.contains("bulk request 7"));
        assert!(text.contains("429"));
        assert!(text.contains("rate limited"));
    }
}
