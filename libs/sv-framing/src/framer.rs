//! Per-session framing: ingest, split, classify, account.

use bytes::Bytes;
use tracing::{trace, warn};

use crate::accumulator::Accumulator;
use crate::codec::common::detect_prefix;
use crate::codec::Codec;
use crate::config::FramingConfig;
use crate::error::Error;
use crate::footprint::Footprint;
use crate::inspect::{classify, classify_bounded, UnitClass};
use crate::split::split;

/// A complete unit and what it was classified as when it was framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUnit {
    pub data: Bytes,
    pub class: UnitClass,
}

impl ClassifiedUnit {
    pub fn new(data: Bytes, codec: Codec) -> Self {
        let class = classify(&data, codec);
        Self { data, class }
    }

    pub fn is_metadata(&self) -> bool {
        self.class.is_metadata()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The bytes of `unit` an engine is given.
///
/// H.264/H.265 units lose their prefix: a 3- or 4-byte start code, or the
/// four bytes of a size field written over one. Four zero bytes are dropped
/// as well. AV1 units are passed whole.
pub fn engine_payload(unit: &[u8], codec: Codec) -> &[u8] {
    if !codec.is_block_based() {
        return unit;
    }
    let skip = detect_prefix(unit).header_offset().unwrap_or(4);
    unit.get(skip..).unwrap_or_default()
}

/// Framing state of one stream.
///
/// H.264/H.265 chunks are taken to be one pre-split unit each. AV1 chunks
/// may cut units anywhere; the bytes of an unfinished unit are carried over
/// to the next chunk.
#[derive(Debug)]
pub struct Framer {
    codec: Codec,
    max_units_per_pass: usize,
    max_leb128_bytes: usize,
    accumulator: Accumulator,
    footprint: Footprint,
    terminated: bool,
}

impl Framer {
    pub fn new(codec: Codec, config: &FramingConfig) -> Self {
        Self {
            codec,
            max_units_per_pass: config.max_units_per_pass,
            max_leb128_bytes: config.max_leb128_bytes,
            accumulator: Accumulator::new(config.max_buffer_bytes),
            footprint: Footprint::default(),
            terminated: false,
        }
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Frame `chunk` and return every unit it completed, in stream order.
    ///
    /// A fatal error ends the session: every later call fails with
    /// [`Error::SessionTerminated`].
    pub fn ingest_chunk(&mut self, chunk: impl Into<Bytes>) -> Result<Vec<ClassifiedUnit>, Error> {
        if self.terminated {
            return Err(Error::SessionTerminated);
        }
        let chunk = chunk.into();
        let result = if self.codec.is_block_based() {
            Ok(self.frame_unit(chunk))
        } else {
            self.frame_obus(&chunk)
        };
        if let Err(err) = &result {
            if err.is_fatal() {
                warn!(%err, codec = %self.codec, "terminating framing session");
                self.terminated = true;
            }
        }
        result
    }

    fn frame_unit(&mut self, chunk: Bytes) -> Vec<ClassifiedUnit> {
        if chunk.is_empty() {
            return Vec::new();
        }
        vec![self.classify_and_record(chunk)]
    }

    fn frame_obus(&mut self, chunk: &[u8]) -> Result<Vec<ClassifiedUnit>, Error> {
        self.accumulator.ingest(chunk)?;
        let mut units = Vec::new();
        loop {
            let pass = split(
                self.accumulator.region(),
                self.max_units_per_pass,
                self.max_leb128_bytes,
            )?;
            for range in &pass.units {
                let data = Bytes::copy_from_slice(&self.accumulator.region()[range.clone()]);
                units.push(self.classify_and_record(data));
            }
            self.accumulator.compact(pass.consumed());
            if !pass.needs_more_input {
                break;
            }
        }
        Ok(units)
    }

    fn classify_and_record(&mut self, data: Bytes) -> ClassifiedUnit {
        let class = classify_bounded(&data, self.codec, self.max_leb128_bytes);
        let unit = ClassifiedUnit { data, class };
        trace!(len = unit.len(), class = ?unit.class, "framed unit");
        self.footprint.record(unit.len(), unit.is_metadata());
        unit
    }

    /// Account for a unit that entered the stream without being framed here,
    /// such as a freshly inserted metadata unit.
    pub fn record(&mut self, unit: &[u8]) {
        let is_metadata = classify_bounded(unit, self.codec, self.max_leb128_bytes).is_metadata();
        self.footprint.record(unit.len(), is_metadata);
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Bytes held back waiting for the rest of a unit.
    pub fn pending_len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Drop any carried-over bytes at teardown. Returns how many were dropped.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.accumulator.reset();
        if dropped > 0 {
            warn!(dropped, codec = %self.codec, "discarding incomplete unit at end of stream");
        }
        dropped
    }
}
