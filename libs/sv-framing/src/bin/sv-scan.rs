use std::path::PathBuf;

use clap::Parser;
use miette::IntoDiagnostic;
use serde::Serialize;
use tracing::{debug, info};

use sv_framing::codec::AnnexBUnitIter;
use sv_framing::{ClassifiedUnit, Codec, Footprint, Framer, FramingConfig};

/// Frame an elementary video stream and report its signing metadata footprint.
#[derive(Parser, Debug)]
#[command(name = "sv-scan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Raw elementary stream (Annex B for h264/h265, low-overhead OBUs for av1)
    file: PathBuf,

    /// Codec of the stream
    #[arg(short = 'C', long, default_value = "h264")]
    codec: Codec,

    /// Bytes handed to the framer per chunk for av1
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,

    /// Path to the framing config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug, Default)]
struct ScanSummary {
    units: u64,
    metadata_units: u64,
    pending_bytes: usize,
    footprint: Footprint,
    metadata_ratio: f64,
}

impl ScanSummary {
    fn record(&mut self, units: &[ClassifiedUnit]) {
        for unit in units {
            debug!(len = unit.len(), class = ?unit.class, "unit");
            self.units += 1;
            if unit.is_metadata() {
                self.metadata_units += 1;
            }
        }
    }
}

fn main() -> miette::Result<()> {
    let _ = tracing_subscriber::fmt::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive("info".parse().expect("invalid filter"))
                .from_env_lossy(),
        )
        .try_init();

    let args = Cli::parse();
    let config = FramingConfig::discover(args.config.as_deref())?;
    let data = std::fs::read(&args.file).into_diagnostic()?;

    let mut framer = Framer::new(args.codec, &config);
    let mut summary = ScanSummary::default();
    if args.codec.is_block_based() {
        for unit in AnnexBUnitIter::new(&data) {
            summary.record(&framer.ingest_chunk(unit.to_vec())?);
        }
    } else {
        for chunk in data.chunks(args.chunk_size.max(1)) {
            summary.record(&framer.ingest_chunk(chunk.to_vec())?);
        }
    }
    summary.pending_bytes = framer.discard_pending();
    summary.footprint = framer.footprint();
    summary.metadata_ratio = summary.footprint.metadata_ratio();

    if args.json {
        let json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
        println!("{json}");
    } else {
        info!(
            file = %args.file.display(),
            codec = %args.codec,
            units = summary.units,
            metadata_units = summary.metadata_units,
            total_bytes = summary.footprint.total_bytes,
            metadata_bytes = summary.footprint.metadata_bytes,
            "metadata overhead {:.3}%",
            summary.metadata_ratio * 100.0
        );
    }
    Ok(())
}
