//! Per-codec bitstream unit layouts.
//!
//! Only the header bytes needed to locate unit boundaries and reach the
//! signing-framework tag are parsed. Nothing here decodes video.
//!
//! # Supported Codecs
//!
//! - **H.264/AVC**: SEI NAL units, 1-byte NAL header
//! - **H.265/HEVC**: prefix SEI NAL units, 2-byte NAL header
//! - **AV1**: metadata OBUs, leb128 sized

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub mod av1;
pub mod common;
pub mod h264;
pub mod h265;

pub use common::{find_start_code, AnnexBUnitIter, Prefix};

/// Fixed identifier carried by every unit a signing stage inserts.
pub const SIGNING_TAG: [u8; 16] = *b"Signed Video...0";

/// SEI payload type for user data unregistered, shared by H.264 and H.265.
pub const SEI_USER_DATA_UNREGISTERED: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    H264,
    H265,
    Av1,
}

impl Codec {
    /// Block-based codecs arrive as pre-split NAL units with a 4-byte prefix;
    /// AV1 arrives as a byte stream that has to be split.
    pub fn is_block_based(self) -> bool {
        matches!(self, Codec::H264 | Codec::H265)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::H265 => "h265",
            Codec::Av1 => "av1",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "h264" | "avc" => Ok(Codec::H264),
            "h265" | "hevc" => Ok(Codec::H265),
            "av1" => Ok(Codec::Av1),
            _ => Err(Error::UnknownCodec(s.to_string())),
        }
    }
}
