//! Validation side of a stream session.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::Codec;
use crate::config::FramingConfig;
use crate::engine::{AuthEngine, Authenticity, EngineError, LatestValidation, ProductInfo};
use crate::error::Error;
use crate::footprint::Footprint;
use crate::framer::{engine_payload, ClassifiedUnit, Framer};

/// Engine outcome for one framed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitVerdict {
    pub unit: ClassifiedUnit,
    /// `Ok(Some(_))` when a validation completed with this unit.
    pub outcome: Result<Option<LatestValidation>, EngineError>,
}

/// Per-GOP counts of validation outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationTally {
    /// Includes GOPs validated with missing information.
    pub valid_gops: u32,
    pub invalid_gops: u32,
    pub unsigned_gops: u32,
    /// Signed but not validated yet.
    pub pending_gops: u32,
    pub engine_errors: u32,
}

impl ValidationTally {
    pub fn record(&mut self, authenticity: Authenticity) {
        match authenticity {
            Authenticity::Ok | Authenticity::OkWithMissingInfo => self.valid_gops += 1,
            Authenticity::NotOk => self.invalid_gops += 1,
            Authenticity::NotSigned => self.unsigned_gops += 1,
            Authenticity::SignaturePresent => self.pending_gops += 1,
        }
    }

    /// One invalid GOP makes the whole video invalid; otherwise one unsigned
    /// GOP makes it unsigned.
    pub fn verdict(&self) -> VideoVerdict {
        if self.invalid_gops > 0 {
            VideoVerdict::Invalid
        } else if self.unsigned_gops > 0 {
            VideoVerdict::NotSigned
        } else if self.valid_gops > 0 {
            VideoVerdict::Valid
        } else {
            VideoVerdict::NoCompleteGops
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoVerdict {
    Invalid,
    NotSigned,
    Valid,
    NoCompleteGops,
}

impl fmt::Display for VideoVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VideoVerdict::Invalid => "video is invalid",
            VideoVerdict::NotSigned => "video is not signed",
            VideoVerdict::Valid => "video is valid",
            VideoVerdict::NoCompleteGops => "no complete gops found",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub verdict: VideoVerdict,
    pub tally: ValidationTally,
    pub footprint: Footprint,
    pub product_info: Option<ProductInfo>,
    pub this_version: Option<String>,
    pub version_on_signing_side: Option<String>,
    pub first_timestamp_usec: Option<i64>,
    pub last_timestamp_usec: Option<i64>,
}

/// Frames a stream and feeds every unit to an authentication engine,
/// collecting the reports it returns.
pub struct ValidationSession<E> {
    framer: Framer,
    engine: E,
    tally: ValidationTally,
    product_info: Option<ProductInfo>,
    this_version: Option<String>,
    version_on_signing_side: Option<String>,
}

impl<E: AuthEngine> ValidationSession<E> {
    pub fn create(codec: Codec, config: &FramingConfig) -> Result<Self, Error> {
        let engine = E::create(codec)?;
        Ok(Self::with_engine(engine, codec, config))
    }

    pub fn with_engine(engine: E, codec: Codec, config: &FramingConfig) -> Self {
        Self {
            framer: Framer::new(codec, config),
            engine,
            tally: ValidationTally::default(),
            product_info: None,
            this_version: None,
            version_on_signing_side: None,
        }
    }

    /// Frame `chunk` and authenticate every unit it completed.
    ///
    /// Engine failures are reported per unit and do not end the session.
    pub fn ingest_chunk(&mut self, chunk: impl Into<Bytes>) -> Result<Vec<UnitVerdict>, Error> {
        let codec = self.framer.codec();
        let units = self.framer.ingest_chunk(chunk)?;
        let mut verdicts = Vec::with_capacity(units.len());
        for unit in units {
            let outcome = match self
                .engine
                .add_unit_and_authenticate(engine_payload(&unit.data, codec))
            {
                Ok(Some(report)) => {
                    let latest = report.latest_validation;
                    debug!(
                        result = latest.authenticity.as_str(),
                        validation = %latest.validation_str,
                        "gop validated"
                    );
                    self.tally.record(latest.authenticity);
                    self.product_info = Some(report.product_info);
                    if self.this_version.is_none() && !report.this_version.is_empty() {
                        self.this_version = Some(report.this_version);
                    }
                    if self.version_on_signing_side.is_none()
                        && !report.version_on_signing_side.is_empty()
                    {
                        self.version_on_signing_side = Some(report.version_on_signing_side);
                    }
                    Ok(Some(latest))
                }
                Ok(None) => Ok(None),
                Err(err) => {
                    warn!(%err, len = unit.len(), "authentication failed for unit");
                    self.tally.engine_errors += 1;
                    Err(err)
                }
            };
            verdicts.push(UnitVerdict { unit, outcome });
        }
        Ok(verdicts)
    }

    /// Mark the end of the stream and summarize the session.
    pub fn finalize(&mut self) -> Result<ValidationSummary, Error> {
        self.framer.discard_pending();
        self.engine.mark_end_of_stream()?;
        let accumulated = self
            .engine
            .authenticity_report()
            .map(|report| report.accumulated_validation)
            .unwrap_or_default();
        Ok(ValidationSummary {
            verdict: self.tally.verdict(),
            tally: self.tally,
            footprint: self.framer.footprint(),
            product_info: self.product_info.clone(),
            this_version: self.this_version.clone(),
            version_on_signing_side: self.version_on_signing_side.clone(),
            first_timestamp_usec: accumulated.first_timestamp_usec,
            last_timestamp_usec: accumulated.last_timestamp_usec,
        })
    }

    pub fn tally(&self) -> ValidationTally {
        self.tally
    }

    pub fn footprint(&self) -> Footprint {
        self.framer.footprint()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
