//! Batch accumulation.
//!
//! Groups record pairs into bulk request payloads of a fixed pair count.
//! A pair is never split across batches, and the final batch of a stream
//! may be smaller than the configured size but is never empty.

use bytes::{BufMut, Bytes, BytesMut};

use super::reader::RecordPair;

/// One bulk request payload: the concatenated, newline-terminated lines of
/// up to `bulk_size` record pairs.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Sequence number in source order, starting at 1. Carried through to
    /// failure reports so a failed request can be traced back to its slice
    /// of the dump.
    pub seq: u64,
    /// Number of record pairs in this batch.
    pub pairs: usize,
    /// Request body, ready to transmit.
    pub body: Bytes,
}

/// Accumulates record pairs and emits a batch every `bulk_size` pairs.
pub struct BatchBuilder {
    bulk_size: usize,
    buf: BytesMut,
    pairs: usize,
    next_seq: u64,
}

impl BatchBuilder {
    pub fn new(bulk_size: usize) -> Self {
        debug_assert!(bulk_size >= 1);
        Self {
            bulk_size,
            buf: BytesMut::new(),
            pairs: 0,
            next_seq: 1,
        }
    }

    /// Append a pair, returning a completed batch once the configured pair
    /// count is reached.
    pub fn push(&mut self, pair: &RecordPair) -> Option<Batch> {
        self.buf.extend_from_slice(&pair.metadata);
        self.buf.put_u8(b'\n');
        self.buf.extend_from_slice(&pair.document);
        self.buf.put_u8(b'\n');
        self.pairs += 1;

        if self.pairs == self.bulk_size {
            Some(self.take())
        } else {
            None
        }
    }

    /// Emit the final undersized batch, if any pairs remain unflushed.
    pub fn finish(mut self) -> Option<Batch> {
        if self.pairs > 0 { Some(self.take()) } else { None }
    }

    fn take(&mut self) -> Batch {
        let seq = self.next_seq;
        self.next_seq += 1;
        let pairs = std::mem::take(&mut self.pairs);
        Batch {
            seq,
            pairs,
            body: self.buf.split().freeze(),
        }
    }
}
