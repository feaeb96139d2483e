//! AV1 unit splitting.
//!
//! Walks an accumulated byte region one OBU at a time. Each OBU is a header
//! (1 or 2 bytes), a leb128 size and that many body bytes. An OBU whose size
//! field or body is not fully present yet ends the walk; its bytes are left
//! as slack for the next pass.

use std::ops::Range;

use tracing::debug;

use crate::codec::av1::obu_header_len;
use crate::error::Error;
use crate::leb128::{decode_leb128_bounded, Leb128Error};

/// Result of one splitter pass over a region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitPass {
    /// Complete units, in order, as ranges into the region.
    pub units: Vec<Range<usize>>,
    /// Trailing bytes not resolved into a unit.
    pub slack: usize,
    /// The per-pass unit ceiling stopped the walk with bytes left over; the
    /// caller should split again after compacting.
    pub needs_more_input: bool,
}

impl SplitPass {
    /// Bytes at the front of the region covered by `units`.
    pub fn consumed(&self) -> usize {
        self.units.last().map_or(0, |r| r.end)
    }
}

/// Split `region` into complete OBUs, emitting at most `max_units`.
///
/// Fails with [`Error::SizeDecodeOverflow`] if a size field runs past
/// `max_leb128_bytes` or does not fit in memory. A size field cut off by the
/// end of the region is not an error.
pub fn split(region: &[u8], max_units: usize, max_leb128_bytes: usize) -> Result<SplitPass, Error> {
    let mut units = Vec::new();
    let mut pos = 0;

    while units.len() < max_units {
        let Some(&header) = region.get(pos) else {
            break;
        };
        let size_offset = pos + obu_header_len(header);
        let overflow = Error::SizeDecodeOverflow {
            offset: size_offset,
            max_bytes: max_leb128_bytes,
        };
        let Some(size_field) = region.get(size_offset..) else {
            break;
        };
        let (body_len, leb_len) = match decode_leb128_bounded(size_field, max_leb128_bytes) {
            Ok(decoded) => decoded,
            Err(Leb128Error::Truncated) => break,
            Err(Leb128Error::Overflow(_)) => return Err(overflow),
        };
        let end = usize::try_from(body_len)
            .ok()
            .and_then(|body_len| (size_offset + leb_len).checked_add(body_len))
            .ok_or(overflow)?;
        if end > region.len() {
            break;
        }
        units.push(pos..end);
        pos = end;
    }

    let slack = region.len() - pos;
    let needs_more_input = units.len() == max_units && slack > 0;
    debug!(units = units.len(), slack, needs_more_input, "split pass");
    Ok(SplitPass {
        units,
        slack,
        needs_more_input,
    })
}
