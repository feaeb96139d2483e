use miette::Diagnostic;
use thiserror::Error;

use crate::engine::EngineError;
use crate::synth::InsertionInstruction;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("malformed unit header: {0}")]
    MalformedHeader(&'static str),
    #[error("leb128 size field at offset {offset} runs past {max_bytes} bytes")]
    #[diagnostic(help("the stream is no longer self-describing; tear the session down"))]
    SizeDecodeOverflow { offset: usize, max_bytes: usize },
    #[error("carry-over buffer would grow to {requested} bytes, limit is {limit}")]
    #[diagnostic(help("raise `max_buffer_bytes` or check the input for a corrupt size field"))]
    CapacityExceeded { requested: usize, limit: usize },
    #[error("engine {0}")]
    Engine(#[from] EngineError),
    #[error("unsupported insertion instruction {0:?}")]
    UnsupportedInsertion(InsertionInstruction),
    #[error("metadata payload of {0} bytes is shorter than its size field")]
    PayloadTooShort(usize),
    #[error("metadata payload of {0} bytes does not fit a 32-bit size field")]
    PayloadTooLarge(usize),
    #[error("session terminated after a fatal framing error")]
    SessionTerminated,
    #[error("invalid config: {0}")]
    Config(String),
    #[error("toml parsing failed")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown codec {0:?}, expected one of h264, h265, av1")]
    UnknownCodec(String),
}

impl Error {
    /// Errors after which the byte stream can no longer be trusted to be
    /// self-describing.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SizeDecodeOverflow { .. } | Error::CapacityExceeded { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
