//! Progress reporting for dump consumption.
//!
//! The pipeline reports how many bytes of the source it has consumed so an
//! external renderer can draw a progress bar. The sink sees a cumulative,
//! monotonically non-decreasing byte count; it carries no other state.

use std::io::Read;
use std::sync::Arc;

/// Receives the cumulative number of bytes consumed from the source.
pub trait ProgressSink: Send + Sync {
    /// Called after every chunk read with the new cumulative total.
    fn consumed(&self, total_bytes: u64);
}

/// A progress sink that discards all updates.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn consumed(&self, _total_bytes: u64) {}
}

/// A reader wrapper that reports cumulative bytes read to a progress sink.
pub struct ProgressReader<R> {
    inner: R,
    sink: Arc<dyn ProgressSink>,
    total: u64,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            inner,
            sink,
            total: 0,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.total += n as u64;
        self.sink.consumed(self.total);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    struct Recording {
        totals: Mutex<Vec<u64>>,
    }

    impl ProgressSink for Recording {
        fn consumed(&self, total_bytes: u64) {
            self.totals.lock().unwrap().push(total_bytes);
        }
    }

    #[test]
    fn test_reports_cumulative_totals() {
        let sink = Arc::new(Recording {
            totals: Mutex::new(Vec::new()),
        });
        let mut reader = ProgressReader::new(Cursor::new(b"hello world".to_vec()), sink.clone());

        let mut buf = [0u8; 4];
        reader.read(&mut buf).unwrap();
        reader.read(&mut buf).unwrap();
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();

        let totals = sink.totals.lock().unwrap();
        assert_eq!(totals.first(), Some(&4));
        // Monotonically non-decreasing, ending at the full input size.
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(totals.last(), Some(&11));
    }
}
