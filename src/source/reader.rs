//! Paired-line dump reader.
//!
//! A dump file alternates action/metadata lines and document lines; every
//! two consecutive non-empty lines form one record pair. The reader streams
//! pairs without buffering the whole file, enforces a per-line size cap, and
//! treats an unpaired trailing metadata line as a fatal input error.

use std::io::{BufRead, Read};

use snafu::prelude::*;

use crate::error::{LineTooLongSnafu, MalformedDumpSnafu, ReadSnafu, ReaderError};

/// One record from the dump: a metadata line and its document line.
///
/// Line terminators are stripped; the batch builder re-adds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPair {
    pub metadata: Vec<u8>,
    pub document: Vec<u8>,
}

/// Streams record pairs from a dump file.
pub struct PairReader<R> {
    inner: R,
    max_line_bytes: usize,
    /// Non-empty lines consumed so far.
    lines: u64,
}

impl<R: BufRead> PairReader<R> {
    /// Create a reader enforcing the given per-line byte cap.
    pub fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner,
            max_line_bytes,
            lines: 0,
        }
    }

    /// Number of non-empty lines consumed so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Read the next record pair, consuming both lines atomically.
    ///
    /// Returns `Ok(None)` at a clean end of stream. A stream ending after a
    /// metadata line fails with `MalformedDump`; a line longer than the cap
    /// fails with `LineTooLong`. Both are fatal for the whole run.
    pub fn next_pair(&mut self) -> Result<Option<RecordPair>, ReaderError> {
        let Some(metadata) = self.next_line()? else {
            return Ok(None);
        };
        let Some(document) = self.next_line()? else {
            return MalformedDumpSnafu { lines: self.lines }.fail();
        };
        Ok(Some(RecordPair { metadata, document }))
    }

    /// Read the next non-empty line with terminators stripped.
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, ReaderError> {
        loop {
            let mut buf = Vec::new();
            // Reading one byte past the cap distinguishes an at-cap line
            // from an oversized one.
            let limit = self.max_line_bytes as u64 + 1;
            let n = (&mut self.inner)
                .take(limit)
                .read_until(b'\n', &mut buf)
                .context(ReadSnafu)? as u64;

            if n == 0 {
                return Ok(None);
            }
            let terminated = buf.last() == Some(&b'\n');
            if !terminated && n == limit {
                return LineTooLongSnafu {
                    line: self.lines + 1,
                    limit: self.max_line_bytes,
                }
                .fail();
            }

            if terminated {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            if buf.is_empty() {
                continue;
            }

            self.lines += 1;
            return Ok(Some(buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(input: &str) -> PairReader<Cursor<Vec<u8>>> {
        PairReader::new(Cursor::new(input.as_bytes().to_vec()), 1024)
    }

    fn collect(input: &str) -> Result<Vec<RecordPair>, ReaderError> {
        let mut r = reader(input);
        let mut pairs = Vec::new();
        while let Some(pair) = r.next_pair()? {
            pairs.push(pair);
        }
        Ok(pairs)
    }

    #[test]
    fn test_pairs_consumed_in_order() {
        let pairs = collect("{\"index\":{\"_id\":\"1\"}}\n{\"f\":1}\n{\"index\":{\"_id\":\"2\"}}\n{\"f\":2}\n").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].metadata, b"{\"index\":{\"_id\":\"1\"}}");
        assert_eq!(pairs[0].document, b"{\"f\":1}");
        assert_eq!(pairs[1].document, b"{\"f\":2}");
    }

    #[test]
    fn test_empty_input_terminates_cleanly() {
        assert!(collect("").unwrap().is_empty());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let pairs = collect("{\"a\":1}\n\n{\"b\":2}\n\n\n").unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].metadata, b"{\"a\":1}");
        assert_eq!(pairs[0].document, b"{\"b\":2}");
    }

    #[test]
    fn test_missing_final_newline_accepted() {
        let pairs = collect("{\"a\":1}\n{\"b\":2}").unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].document, b"{\"b\":2}");
    }

    #[test]
    fn test_crlf_terminators_stripped() {
        let pairs = collect("{\"a\":1}\r\n{\"b\":2}\r\n").unwrap();
        assert_eq!(pairs[0].metadata, b"{\"a\":1}");
        assert_eq!(pairs[0].document, b"{\"b\":2}");
    }

    #[test]
    fn test_odd_line_count_is_malformed() {
        let err = collect("{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n").unwrap_err();
        assert!(matches!(err, ReaderError::MalformedDump { lines: 3 }));
    }

    #[test]
    fn test_single_line_is_malformed() {
        let err = collect("{\"a\":1}\n").unwrap_err();
        assert!(matches!(err, ReaderError::MalformedDump { lines: 1 }));
    }

    #[test]
    fn test_line_at_cap_accepted() {
        let line = "x".repeat(1024);
        let input = format!("{line}\n{line}\n");
        let pairs = collect(&input).unwrap();
        assert_eq!(pairs[0].metadata.len(), 1024);
    }

    #[test]
    fn test_line_over_cap_rejected() {
        let input = format!("{}\n{{\"b\":2}}\n", "x".repeat(1025));
        let err = collect(&input).unwrap_err();
        assert!(matches!(
            err,
            ReaderError::LineTooLong { line: 1, limit: 1024 }
        ));
    }

    #[test]
    fn test_oversized_line_deep_in_stream_names_its_position() {
        let input = format!("{{\"a\":1}}\n{{\"b\":2}}\n{{\"c\":3}}\n{}\n", "x".repeat(2048));
        let err = collect(&input).unwrap_err();
        assert!(matches!(err, ReaderError::LineTooLong { line: 4, .. }));
    }
}
