//! Defines the parameters used by the charge extraction stages.
use crate::extraction::{Real, WindowMargins};
use clap::{Parser, ValueEnum};
use scope_charge_common::SourceKind;

/// Determines how events which never cross their timing threshold are treated.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum CrossingPolicy {
    /// Such events are timed at the first sample of the time axis.
    #[default]
    Preserve,
    /// Such events are left out of the integration window's median.
    Discard,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct ExtractionParameters {
    /// Width, in ns, of the leading, signal-free, part of each waveform used to estimate noise.
    #[clap(long, env, default_value = "10")]
    pub(crate) baseline_width: Real,

    /// An event is pulsed if its minimum lies below this many noise scales under zero.
    #[clap(long, env, default_value = "5")]
    pub(crate) pulse_threshold: Real,

    /// Overrides the source's default margin, in ns, before the median crossing time.
    #[clap(long, env)]
    pub(crate) left_margin: Option<Real>,

    /// Overrides the source's default margin, in ns, after the median crossing time.
    #[clap(long, env)]
    pub(crate) right_margin: Option<Real>,

    #[clap(long, env, value_enum, default_value_t)]
    pub(crate) crossing_policy: CrossingPolicy,

    /// If set, each event has its mean baseline subtracted before any other processing.
    #[clap(long, env)]
    pub(crate) baseline_correction: bool,
}

impl Default for ExtractionParameters {
    fn default() -> Self {
        Self {
            baseline_width: 10.0,
            pulse_threshold: 5.0,
            left_margin: None,
            right_margin: None,
            crossing_policy: CrossingPolicy::default(),
            baseline_correction: false,
        }
    }
}

impl ExtractionParameters {
    pub(crate) fn margins(&self, source: SourceKind) -> WindowMargins {
        let defaults = WindowMargins::for_source(source);
        WindowMargins {
            left: self.left_margin.unwrap_or(defaults.left),
            right: self.right_margin.unwrap_or(defaults.right),
        }
    }
}
