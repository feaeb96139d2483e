//! Capabilities expected from the external signing/authentication engine.
//!
//! The engine owns all cryptography and its own internal state. A session
//! holds exactly one engine instance and calls it synchronously; dropping
//! the instance releases it.

use serde::Serialize;
use thiserror::Error;

use crate::codec::Codec;
use crate::synth::PendingMetadata;

/// Non-success status reported by an engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("ran out of memory")]
    Memory,
    #[error("rejected an invalid parameter")]
    InvalidParameter,
    #[error("does not support the operation")]
    NotSupported,
    #[error("is incompatible with the stream version")]
    IncompatibleVersion,
    #[error("external failure: {0}")]
    External(String),
    #[error("authenticity check failed")]
    Authenticity,
    #[error("returned unknown status {0}")]
    Unknown(i32),
}

/// Signing side of the engine.
pub trait SigningEngine {
    fn create(codec: Codec) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Hand one unit to the engine. For H.264/H.265 the 4-byte prefix is
    /// already stripped.
    fn add_unit_for_signing(
        &mut self,
        unit: &[u8],
        timestamp_usec: Option<i64>,
    ) -> Result<(), EngineError>;

    /// Next metadata payload waiting to be inserted, if any. Polled until it
    /// returns `Ok(None)`.
    fn next_metadata_to_prepend(&mut self) -> Result<Option<PendingMetadata>, EngineError>;

    fn mark_end_of_stream(&mut self) -> Result<(), EngineError>;
}

/// Validation side of the engine.
pub trait AuthEngine {
    fn create(codec: Codec) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Hand one unit to the engine. Returns a report whenever a validation
    /// completed with this unit.
    fn add_unit_and_authenticate(
        &mut self,
        unit: &[u8],
    ) -> Result<Option<AuthenticityReport>, EngineError>;

    fn mark_end_of_stream(&mut self) -> Result<(), EngineError>;

    /// Report covering everything validated so far.
    fn authenticity_report(&mut self) -> Option<AuthenticityReport>;
}

/// Outcome of validating one group of pictures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Authenticity {
    Ok,
    NotOk,
    OkWithMissingInfo,
    #[default]
    NotSigned,
    /// A signature was seen but could not be validated yet.
    SignaturePresent,
}

impl Authenticity {
    pub fn as_str(self) -> &'static str {
        match self {
            Authenticity::Ok | Authenticity::OkWithMissingInfo => "valid",
            Authenticity::NotOk => "invalid",
            Authenticity::NotSigned => "unsigned",
            Authenticity::SignaturePresent => "signed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LatestValidation {
    pub authenticity: Authenticity,
    /// Per-unit validation characters as produced by the engine.
    pub validation_str: String,
    pub timestamp_usec: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccumulatedValidation {
    pub authenticity: Authenticity,
    pub received_units: u64,
    pub validated_units: u64,
    pub pending_units: u64,
    pub first_timestamp_usec: Option<i64>,
    pub last_timestamp_usec: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductInfo {
    pub hardware_id: String,
    pub firmware_version: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthenticityReport {
    pub latest_validation: LatestValidation,
    pub accumulated_validation: AccumulatedValidation,
    pub product_info: ProductInfo,
    pub this_version: String,
    pub version_on_signing_side: String,
}
