//! Generates the waveforms of a single channel.
use crate::{noise::NoiseSource, pulse::BiExpPulse};
use clap::Args;
use rand::Rng;
use rand_distr::{Distribution, Poisson, PoissonError};
use scope_charge_common::{
    Channel, Real, SourceKind,
    capture::{ChannelCapture, TimeAxisDescriptor},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SimulationError {
    #[error("Invalid noise: {0}")]
    Noise(#[from] rand_distr::NormalError),
    #[error("Invalid photoelectron distribution: {0}")]
    Photoelectrons(#[from] PoissonError),
    #[error("Time increment {0} is not positive")]
    NonPositiveIncrement(Real),
    #[error("Rise time {rise} must be positive and shorter than decay time {decay}")]
    PulseShape { rise: Real, decay: Real },
}

#[derive(Clone, Debug, Args)]
pub(crate) struct SimulationParameters {
    /// Number of events, or segments, per channel
    #[clap(long, default_value = "1000")]
    pub(crate) events: usize,

    /// Number of samples per event
    #[clap(long, default_value = "400")]
    pub(crate) samples: usize,

    /// Time, in ns, of the first sample
    #[clap(long, default_value = "-20", allow_hyphen_values = true)]
    pub(crate) origin: Real,

    /// Time, in ns, between samples
    #[clap(long, default_value = "0.5")]
    pub(crate) increment: Real,

    #[clap(long, value_enum, default_value_t)]
    pub(crate) source: SourceKind,

    /// Standard deviation, in V, of the noise on each sample
    #[clap(long, default_value = "0.0005")]
    pub(crate) noise_sd: Real,

    /// Mean number of photoelectrons per event
    #[clap(long, default_value = "1.5")]
    pub(crate) mean_photoelectrons: Real,

    /// Peak height, in V, of a single photoelectron pulse
    #[clap(long, default_value = "0.005")]
    pub(crate) single_pe_amplitude: Real,

    /// Time, in ns, at which pulses begin
    #[clap(long, default_value = "20")]
    pub(crate) pulse_time: Real,

    /// Rise time constant, in ns
    #[clap(long, default_value = "1")]
    pub(crate) rise_time: Real,

    /// Decay time constant, in ns. Defaults to 5 ns, or 40 ns for a long-decay source
    #[clap(long)]
    pub(crate) decay_time: Option<Real>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            events: 1000,
            samples: 400,
            origin: -20.0,
            increment: 0.5,
            source: SourceKind::default(),
            noise_sd: 0.0005,
            mean_photoelectrons: 1.5,
            single_pe_amplitude: 0.005,
            pulse_time: 20.0,
            rise_time: 1.0,
            decay_time: None,
        }
    }
}

impl SimulationParameters {
    pub(crate) fn decay_time(&self) -> Real {
        self.decay_time.unwrap_or(match self.source {
            SourceKind::Generic => 5.0,
            SourceKind::LongDecay => 40.0,
        })
    }

    pub(crate) fn time_axis(&self) -> TimeAxisDescriptor {
        TimeAxisDescriptor {
            origin: self.origin,
            increment: self.increment,
            samples: self.samples,
        }
    }
}

/// Produces one event's waveform, given its photoelectron count.
pub(crate) struct ChannelSimulation<'a> {
    parameters: &'a SimulationParameters,
    time: Vec<Real>,
    noise: NoiseSource,
    photoelectrons: Poisson<Real>,
}

impl<'a> ChannelSimulation<'a> {
    pub(crate) fn new(parameters: &'a SimulationParameters) -> Result<Self, SimulationError> {
        if parameters.increment <= 0.0 {
            return Err(SimulationError::NonPositiveIncrement(parameters.increment));
        }
        let decay = parameters.decay_time();
        if parameters.rise_time <= 0.0 || parameters.rise_time >= decay {
            return Err(SimulationError::PulseShape {
                rise: parameters.rise_time,
                decay,
            });
        }
        Ok(Self {
            parameters,
            time: parameters.time_axis().values(),
            noise: NoiseSource::new(parameters.noise_sd)?,
            photoelectrons: Poisson::new(parameters.mean_photoelectrons)?,
        })
    }

    pub(crate) fn photoelectrons<R: Rng>(&self, rng: &mut R) -> u32 {
        self.photoelectrons.sample(rng) as u32
    }

    pub(crate) fn waveform<R: Rng>(&self, photoelectrons: u32, rng: &mut R) -> Vec<Real> {
        let pulse = (photoelectrons > 0).then(|| {
            BiExpPulse::new(
                self.parameters.pulse_time,
                self.parameters.rise_time,
                self.parameters.decay_time(),
                Real::from(photoelectrons) * self.parameters.single_pe_amplitude,
            )
        });
        self.time
            .iter()
            .map(|&time| {
                let value = pulse.map(|pulse| pulse.value_at(time)).unwrap_or_default();
                self.noise.noisify(value, rng)
            })
            .collect()
    }

    #[tracing::instrument(skip_all, fields(channel = channel, num_pulsed))]
    pub(crate) fn capture<R: Rng>(&self, channel: Channel, rng: &mut R) -> ChannelCapture {
        let counts: Vec<_> = (0..self.parameters.events)
            .map(|_| self.photoelectrons(rng))
            .collect();
        tracing::Span::current().record("num_pulsed", counts.iter().filter(|&&k| k > 0).count());

        ChannelCapture {
            channel,
            source: self.parameters.source,
            time_axis: self.parameters.time_axis(),
            waveforms: counts
                .into_iter()
                .map(|photoelectrons| self.waveform(photoelectrons, rng))
                .collect(),
        }
    }
}
