//! Tools for converting a set of captured waveforms into one charge value per event.
//!
//! Each channel passes through the same stages:
//! ```text
//! samples -> noise scale -> pulse mask -> crossing times -> integration window -> charges
//! ```
//! and the charges are then binned for the downstream fitter. Every stage is a pure function
//! of its inputs, so channels can be processed independently.

pub(crate) mod baseline;
pub(crate) mod binning;
pub(crate) mod integrator;
pub(crate) mod noise;
pub(crate) mod pulse_selection;
pub(crate) mod save_to_file;
pub(crate) mod stats;
pub(crate) mod timing;
pub(crate) mod window;

pub(crate) use baseline::baseline_corrected;
pub(crate) use binning::{BinEdges, Histogram};
pub(crate) use integrator::integrate_charges;
pub(crate) use noise::noise_scale;
pub(crate) use pulse_selection::PulseMask;
pub(crate) use save_to_file::SaveToFileFilter;
pub(crate) use timing::extract_crossings;
pub(crate) use window::{IntegrationWindow, WindowMargins};

pub(crate) use scope_charge_common::Real;
