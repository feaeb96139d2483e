//! Turning engine-produced metadata into insertable units.
//!
//! The engine hands back a complete unit whose first four bytes are reserved
//! for a big-endian size. The size excludes the field itself:
//!
//! ```text
//! [u32 BE: len - 4][unit header][payload ...]
//! ```
//!
//! AV1 metadata OBUs carry their own leb128 size and are inserted as is.

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::access_unit::AccessUnit;
use crate::codec::Codec;
use crate::engine::{EngineError, SigningEngine};
use crate::error::Error;

/// Where the engine wants a metadata unit placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionInstruction {
    /// Insert into the current access unit, before the unit being signed.
    Prepend,
    /// Any instruction code this crate does not implement.
    Other(u8),
}

/// Metadata as returned by [`SigningEngine::next_metadata_to_prepend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMetadata {
    pub payload: Vec<u8>,
    pub instruction: InsertionInstruction,
}

impl PendingMetadata {
    pub fn prepend(payload: Vec<u8>) -> Self {
        Self {
            payload,
            instruction: InsertionInstruction::Prepend,
        }
    }
}

/// A metadata unit with its size field written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUnit {
    pub data: Bytes,
    pub instruction: InsertionInstruction,
}

/// Write the size field into `payload` and wrap it for insertion.
///
/// ```
/// use sv_framing::{finalize_for_insertion, InsertionInstruction};
///
/// let unit = finalize_for_insertion(vec![0, 0, 0, 0, 0x06, 0x05], InsertionInstruction::Prepend).unwrap();
/// assert_eq!(&unit.data[..4], &[0, 0, 0, 2]);
/// ```
pub fn finalize_for_insertion(
    mut payload: Vec<u8>,
    instruction: InsertionInstruction,
) -> Result<MetadataUnit, Error> {
    if let InsertionInstruction::Other(_) = instruction {
        return Err(Error::UnsupportedInsertion(instruction));
    }
    let len = payload.len();
    let Some(size) = len.checked_sub(4) else {
        return Err(Error::PayloadTooShort(len));
    };
    let size = u32::try_from(size).map_err(|_| Error::PayloadTooLarge(len))?;
    BigEndian::write_u32(&mut payload[..4], size);
    Ok(MetadataUnit {
        data: Bytes::from(payload),
        instruction,
    })
}

/// [`finalize_for_insertion`] for H.264/H.265; AV1 units only have their
/// instruction checked.
pub fn finalize_for_codec(
    payload: Vec<u8>,
    instruction: InsertionInstruction,
    codec: Codec,
) -> Result<MetadataUnit, Error> {
    if codec.is_block_based() {
        return finalize_for_insertion(payload, instruction);
    }
    if let InsertionInstruction::Other(_) = instruction {
        return Err(Error::UnsupportedInsertion(instruction));
    }
    Ok(MetadataUnit {
        data: Bytes::from(payload),
        instruction,
    })
}

/// What a drain of the engine's pending metadata produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drained {
    /// Units inserted into the access unit, failure or not.
    pub inserted: usize,
    /// The engine failure that stopped the drain early.
    pub error: Option<EngineError>,
}

/// Poll `engine` for pending metadata and insert each unit into `au`,
/// starting at `idx`, in the order the engine returned them.
///
/// Units that cannot be inserted are dropped with a warning. An engine
/// failure stops the drain; units inserted before it stay in `au`.
pub fn drain_pending_metadata<E: SigningEngine>(
    engine: &mut E,
    au: &mut AccessUnit,
    idx: usize,
    codec: Codec,
) -> Drained {
    let mut drained = Drained::default();
    loop {
        let pending = match engine.next_metadata_to_prepend() {
            Ok(Some(pending)) => pending,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, at = idx + drained.inserted, "engine failed while draining metadata");
                drained.error = Some(err);
                break;
            }
        };
        match finalize_for_codec(pending.payload, pending.instruction, codec) {
            Ok(unit) => {
                let at = idx + drained.inserted;
                debug!(len = unit.data.len(), at, "inserting metadata unit");
                au.insert(at, unit.data);
                drained.inserted += 1;
            }
            Err(err) => warn!(%err, "dropping metadata unit"),
        }
    }
    drained
}
