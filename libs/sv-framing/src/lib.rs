//! # sv-framing
//!
//! Bitstream unit framing and signing-metadata detection for signed video.
//!
//! Sits between an arbitrarily chunked elementary stream and an external
//! signing/authentication engine:
//!
//! - Reassembles chunks into complete units (NAL units for H.264/H.265, OBUs for AV1)
//! - Recognizes units carrying signing metadata by their 16-byte framework tag
//! - Turns metadata returned by a signing engine into insertable, length-prefixed units
//! - Keeps a per-session byte footprint of ordinary vs. metadata units
//!
//! It does not decode video, validate codec conformance, or verify signatures.
//!
//! # Example
//!
//! ```
//! use sv_framing::{Codec, FramingConfig, Framer};
//!
//! let mut framer = Framer::new(Codec::Av1, &FramingConfig::default());
//!
//! // Temporal delimiter OBU split over two chunks.
//! assert!(framer.ingest_chunk(vec![0x12]).unwrap().is_empty());
//! let units = framer.ingest_chunk(vec![0x00]).unwrap();
//! assert_eq!(units.len(), 1);
//! assert_eq!(&units[0].data[..], &[0x12, 0x00]);
//! ```

pub mod access_unit;
pub mod accumulator;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod footprint;
pub mod framer;
pub mod inspect;
pub mod leb128;
pub mod sign;
pub mod split;
pub mod synth;
pub mod validate;

pub use access_unit::AccessUnit;
pub use accumulator::Accumulator;
pub use codec::{Codec, SIGNING_TAG};
pub use config::FramingConfig;
pub use engine::{
    AccumulatedValidation, AuthEngine, Authenticity, AuthenticityReport, EngineError,
    LatestValidation, ProductInfo, SigningEngine,
};
pub use error::{Error, Result};
pub use footprint::Footprint;
pub use framer::{ClassifiedUnit, Framer};
pub use inspect::{classify, classify_bounded, inspect, inspect_bounded, UnitClass, UnitHeader};
pub use sign::{SignedAccessUnit, SigningSession};
pub use synth::{
    drain_pending_metadata, finalize_for_codec, finalize_for_insertion, Drained,
    InsertionInstruction, MetadataUnit, PendingMetadata,
};
pub use validate::{
    UnitVerdict, ValidationSession, ValidationSummary, ValidationTally, VideoVerdict,
};
