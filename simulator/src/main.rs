mod noise;
mod pulse;
mod simulation;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use scope_charge_common::{
    Channel, Real, RunNumber,
    acquisition::{AcquisitionSettings, TriggerSettings, TriggerSource, VerticalSettings},
    capture::CaptureFile,
    init_tracer,
    tracer::TracerOptions,
};
use simulation::{ChannelSimulation, SimulationParameters};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// File to write the capture to
    #[clap(long)]
    output: PathBuf,

    #[clap(long, default_value = "0")]
    run_number: RunNumber,

    /// Comma separated list of channels to simulate
    #[clap(long, value_delimiter = ',', default_value = "1")]
    channels: Vec<Channel>,

    /// Seed for the random number generator, a random seed is used if absent
    #[clap(long)]
    seed: Option<u64>,

    /// Vertical scale, in V per division, recorded for each channel
    #[clap(long, default_value = "0.005")]
    volts_per_division: Real,

    /// Trigger level, in V, recorded for the first channel
    #[clap(long, default_value = "-0.0023", allow_hyphen_values = true)]
    trigger_level: Real,

    #[clap(flatten)]
    simulation: SimulationParameters,
}

impl Cli {
    /// The settings an instrument would need to record this capture.
    fn acquisition_settings(&self) -> AcquisitionSettings {
        let defaults = AcquisitionSettings::default();
        AcquisitionSettings {
            horizontal_range: self.simulation.samples as Real * self.simulation.increment * 1e-9,
            segments: self.simulation.events,
            vertical: self
                .channels
                .iter()
                .map(|&channel| VerticalSettings {
                    channel,
                    volts_per_division: self.volts_per_division,
                    offset: 0.0,
                })
                .collect(),
            trigger: TriggerSettings {
                source: self
                    .channels
                    .first()
                    .map(|&channel| TriggerSource::Channel(channel))
                    .unwrap_or(TriggerSource::Aux),
                level: self.trigger_level,
                ..defaults.trigger
            },
            ..defaults
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(TracerOptions::default());
    info!("Starting {}", tracer.service_name());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let simulation = ChannelSimulation::new(&args.simulation)?;
    let channels = args
        .channels
        .iter()
        .map(|&channel| simulation.capture(channel, &mut rng))
        .collect();

    let capture = CaptureFile {
        run_number: args.run_number,
        created: Some(Utc::now()),
        settings: args.acquisition_settings().commands(),
        channels,
    };
    capture
        .save(&args.output)
        .with_context(|| format!("Cannot write capture to {}", args.output.display()))?;
    info!(
        "Wrote {} channels of {} events to {}",
        args.channels.len(),
        args.simulation.events,
        args.output.display()
    );
    Ok(())
}
