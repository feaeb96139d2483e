//! Unit header inspection.
//!
//! Walks just enough of a unit's header to reach the position where a
//! signing-framework tag would sit, then compares the tag. Every byte access
//! is bounds checked; a header that ends early classifies as ordinary.

use serde::Serialize;
use tracing::trace;

use crate::codec::common::detect_prefix;
use crate::codec::{av1, h264, h265, Codec, Prefix, SIGNING_TAG};
use crate::error::Error;
use crate::leb128::MAX_LEB128_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Ordinary,
    SigningMetadata,
}

impl UnitClass {
    pub fn is_metadata(self) -> bool {
        self == UnitClass::SigningMetadata
    }
}

/// What inspection learned about one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitHeader {
    pub prefix: Prefix,
    /// NAL unit type or OBU type; `None` when the header could not be reached.
    pub unit_type: Option<u8>,
    pub class: UnitClass,
}

/// Inspect a single unit.
///
/// Block-based units are expected to start with a start code or a 4-byte
/// field that replaced it; AV1 units start at the OBU header.
pub fn inspect(unit: &[u8], codec: Codec) -> UnitHeader {
    inspect_bounded(unit, codec, MAX_LEB128_BYTES)
}

/// [`inspect`] with AV1 size fields allowed to run to `max_leb128_bytes`.
pub fn inspect_bounded(unit: &[u8], codec: Codec, max_leb128_bytes: usize) -> UnitHeader {
    let prefix = if codec.is_block_based() {
        detect_prefix(unit)
    } else {
        Prefix::None
    };

    let unit_type = prefix
        .header_offset()
        .and_then(|pos| unit.get(pos))
        .map(|&b| match codec {
            Codec::H264 => h264::nal_type(b),
            Codec::H265 => h265::nal_type(b),
            Codec::Av1 => av1::obu_type(b),
        });

    let class = match tag_offset(unit, codec, prefix, max_leb128_bytes) {
        Ok(offset) if has_tag_at(unit, offset) => UnitClass::SigningMetadata,
        Ok(_) => UnitClass::Ordinary,
        Err(err) => {
            trace!(%codec, len = unit.len(), %err, "classified as ordinary");
            UnitClass::Ordinary
        }
    };

    UnitHeader {
        prefix,
        unit_type,
        class,
    }
}

/// Classify a single unit. Equivalent to `inspect(unit, codec).class`.
pub fn classify(unit: &[u8], codec: Codec) -> UnitClass {
    inspect(unit, codec).class
}

pub fn classify_bounded(unit: &[u8], codec: Codec, max_leb128_bytes: usize) -> UnitClass {
    inspect_bounded(unit, codec, max_leb128_bytes).class
}

fn tag_offset(
    unit: &[u8],
    codec: Codec,
    prefix: Prefix,
    max_leb128_bytes: usize,
) -> Result<usize, Error> {
    let pos = prefix
        .header_offset()
        .ok_or(Error::MalformedHeader("four zero bytes before the NAL header"))?;
    let offset = match codec {
        Codec::H264 => h264::signing_tag_offset(unit, pos),
        Codec::H265 => h265::signing_tag_offset(unit, pos),
        Codec::Av1 => av1::signing_tag_offset(unit, max_leb128_bytes),
    };
    offset.ok_or(Error::MalformedHeader("not a signing metadata header"))
}

fn has_tag_at(unit: &[u8], offset: usize) -> bool {
    unit.get(offset..offset + SIGNING_TAG.len()) == Some(&SIGNING_TAG[..])
}
