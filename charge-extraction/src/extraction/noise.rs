use super::{Real, stats::interquartile_range};
use ndarray::s;
use scope_charge_common::capture::WaveformSet;
use tracing::warn;

/// The number of leading samples whose time is strictly before `time[0] + baseline_width`.
pub(crate) fn baseline_length(time: &[Real], baseline_width: Real) -> usize {
    let Some(&origin) = time.first() else {
        return 0;
    };
    time.partition_point(|&t| t < origin + baseline_width)
}

/// Estimates the noise floor of a channel as the interquartile range of every baseline sample
/// of every event. NaN if the baseline region holds no samples.
#[tracing::instrument(skip_all, level = "trace", fields(baseline_length))]
pub(crate) fn noise_scale(waveforms: &WaveformSet, baseline_width: Real) -> Real {
    let length = baseline_length(waveforms.time(), baseline_width);
    tracing::Span::current().record("baseline_length", length);

    let baseline: Vec<Real> = waveforms
        .samples()
        .slice(s![.., ..length])
        .iter()
        .copied()
        .collect();
    if baseline.is_empty() {
        warn!("Baseline width of {baseline_width} ns contains no samples, noise scale is undefined");
    }
    interquartile_range(&baseline)
}
