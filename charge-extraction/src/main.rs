mod channels;
mod extraction;
mod parameters;
mod processing;

use anyhow::Context;
use clap::Parser;
use parameters::ExtractionParameters;
use processing::{process, save_report, write_report};
use scope_charge_common::{Channel, capture::CaptureFile, init_tracer, tracer::TracerOptions};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Capture file holding the waveforms of each channel
    #[clap(long, env)]
    capture_file: PathBuf,

    /// File to write the extraction report to, stdout is used if absent
    #[clap(long, env)]
    report_file: Option<PathBuf>,

    /// Comma separated list of channels to process, every channel is processed if absent
    #[clap(long, env, value_delimiter = ',')]
    channels: Vec<Channel>,

    /// If set, the charges and histogram of each channel are saved as csv files in this directory
    #[clap(long, env)]
    save_path: Option<PathBuf>,

    /// Filter for log output, overrides RUST_LOG
    #[clap(long, env)]
    log_filter: Option<String>,

    #[clap(flatten)]
    parameters: ExtractionParameters,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(TracerOptions {
        log_filter: args.log_filter.as_deref(),
    });
    info!("Starting {}", tracer.service_name());
    debug!("{args:?}");

    let capture = CaptureFile::load(&args.capture_file).with_context(|| {
        format!("Cannot load capture file {}", args.capture_file.display())
    })?;
    info!(
        "Loaded run {} with {} channels",
        capture.run_number,
        capture.channels.len()
    );
    if let Some(created) = capture.created {
        debug!("Capture created at {created}");
    }
    for setting in &capture.settings {
        debug!("Acquired with: {setting}");
    }

    let report = process(&capture, &args.parameters, &args.channels)?;
    if report.channels.is_empty() {
        tracing::warn!("No channels matched {:?}", args.channels);
    }

    if let Some(save_path) = &args.save_path {
        save_report(&report, save_path)
            .with_context(|| format!("Cannot save csv files to {}", save_path.display()))?;
    }
    write_report(&report, args.report_file.as_deref()).context("Cannot write report")?;
    Ok(())
}
