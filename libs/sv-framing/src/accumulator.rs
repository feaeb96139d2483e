//! Carry-over buffer between splitter passes.

use crate::error::Error;

/// Smallest allocation made on first growth.
const MIN_CAPACITY: usize = 4096;

/// Owned byte buffer holding the slack of the previous split pass followed
/// by newly ingested chunk bytes, in arrival order.
///
/// One accumulator belongs to exactly one stream session.
#[derive(Debug)]
pub struct Accumulator {
    buf: Vec<u8>,
    max_len: usize,
}

impl Accumulator {
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_len,
        }
    }

    /// Append `chunk` after the retained slack.
    ///
    /// The backing storage at least doubles whenever it has to grow, capped
    /// at the configured maximum. Fails with [`Error::CapacityExceeded`] if
    /// the buffered bytes would exceed it; nothing is appended in that case.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<(), Error> {
        let requested = self.buf.len().saturating_add(chunk.len());
        if requested > self.max_len {
            return Err(Error::CapacityExceeded {
                requested,
                limit: self.max_len,
            });
        }
        if requested > self.buf.capacity() {
            let target = requested
                .max(self.buf.capacity().saturating_mul(2))
                .max(MIN_CAPACITY)
                .min(self.max_len);
            self.buf.reserve_exact(target - self.buf.len());
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    /// Bytes not yet resolved into units.
    pub fn region(&self) -> &[u8] {
        &self.buf
    }

    /// Drop the first `consumed` bytes, moving the remaining slack to the
    /// front and zeroing the vacated tail.
    pub fn compact(&mut self, consumed: usize) {
        let consumed = consumed.min(self.buf.len());
        if consumed == 0 {
            return;
        }
        let remaining = self.buf.len() - consumed;
        self.buf.copy_within(consumed.., 0);
        self.buf[remaining..].fill(0);
        self.buf.truncate(remaining);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Discard all buffered bytes and release the storage. Returns how many
    /// bytes were dropped.
    pub fn reset(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf = Vec::new();
        dropped
    }
}
