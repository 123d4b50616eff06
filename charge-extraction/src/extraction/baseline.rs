use super::{Real, noise::baseline_length};
use ndarray::{Axis, s};
use scope_charge_common::capture::WaveformSet;
use tracing::warn;

/// Returns a new set in which each event has the mean of its own baseline samples subtracted.
/// The input is returned unchanged if the baseline region holds no samples.
#[tracing::instrument(skip_all, level = "trace")]
pub(crate) fn baseline_corrected(waveforms: &WaveformSet, baseline_width: Real) -> WaveformSet {
    let length = baseline_length(waveforms.time(), baseline_width);
    match waveforms.samples().slice(s![.., ..length]).mean_axis(Axis(1)) {
        Some(offsets) if length > 0 => waveforms.offset_events(&offsets),
        _ => {
            warn!("Baseline width of {baseline_width} ns contains no samples, skipping correction");
            waveforms.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn subtracts_each_events_baseline() {
        let set = WaveformSet::try_new(
            array![[0.1, 0.3, -1.0, 0.2], [-0.2, -0.2, -0.2, -0.7]],
            vec![0.0, 1.0, 2.0, 3.0],
        )
        .unwrap();
        let corrected = baseline_corrected(&set, 2.0);
        let samples = corrected.samples();

        assert_approx_eq!(samples[[0, 0]], -0.1);
        assert_approx_eq!(samples[[0, 2]], -1.2);
        assert_approx_eq!(samples[[1, 2]], 0.0);
        assert_approx_eq!(samples[[1, 3]], -0.5);
        assert_eq!(corrected.time(), set.time());
    }

    #[test]
    fn input_is_untouched() {
        let set = WaveformSet::try_new(array![[1.0, 1.0, 3.0]], vec![0.0, 1.0, 2.0]).unwrap();
        let corrected = baseline_corrected(&set, 1.5);
        assert_eq!(set.samples(), array![[1.0, 1.0, 3.0]]);
        assert_eq!(corrected.samples(), array![[0.0, 0.0, 2.0]]);
    }

    #[test]
    fn empty_baseline_is_a_no_op() {
        let set = WaveformSet::try_new(array![[1.0, 2.0]], vec![0.0, 1.0]).unwrap();
        assert_eq!(baseline_corrected(&set, 0.0), set);
    }
}
