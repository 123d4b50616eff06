use super::{Real, window::IntegrationWindow};
use itertools::Itertools;
use ndarray::{ArrayView1, Axis, s};
use scope_charge_common::capture::WaveformSet;

/// Characteristic impedance of the readout, in ohms.
pub(crate) const IMPEDANCE: Real = 50.0;
/// Volt-nanoseconds per ohm are nanocoulombs.
const PICOCOULOMBS_PER_NANOCOULOMB: Real = 1000.0;

/// Integrates `values` over `time` using the trapezoidal rule.
/// Fewer than two samples integrate to zero.
pub(crate) fn trapezoid(values: ArrayView1<Real>, time: &[Real]) -> Real {
    values
        .iter()
        .zip(time)
        .tuple_windows()
        .map(|((v0, t0), (v1, t1))| 0.5 * (v0 + v1) * (t1 - t0))
        .sum()
}

/// Converts an integrated voltage, in V·ns, from a negative-going pulse into a positive
/// charge in pC.
pub(crate) fn to_charge(integral: Real) -> Real {
    -integral * PICOCOULOMBS_PER_NANOCOULOMB / IMPEDANCE
}

/// Integrates every event of `waveforms` over `window`.
/// Returns one charge per event, whatever the events' pulse classification.
#[tracing::instrument(skip_all, level = "trace", fields(start = window.start, stop = window.stop))]
pub(crate) fn integrate_charges(waveforms: &WaveformSet, window: &IntegrationWindow) -> Vec<Real> {
    let range = window.start..window.stop;
    let time = waveforms.time().get(range.clone()).unwrap_or_default();
    waveforms
        .samples()
        .slice(s![.., range])
        .axis_iter(Axis(0))
        .map(|event| to_charge(trapezoid(event, time)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::{Array2, array};

    fn set(samples: Array2<Real>, increment: Real) -> WaveformSet {
        let time = (0..samples.ncols()).map(|i| i as Real * increment).collect();
        WaveformSet::try_new(samples, time).unwrap()
    }

    #[test]
    fn trapezoid_rule() {
        let values = array![0.0, 1.0, 2.0, 1.0];
        assert_approx_eq!(trapezoid(values.view(), &[0.0, 1.0, 2.0, 4.0]), 5.0);
        assert_eq!(trapezoid(array![3.0].view(), &[0.0]), 0.0);
        assert_eq!(trapezoid(array![].view(), &[]), 0.0);
    }

    #[test]
    fn rectangular_pulse() {
        // A pulse of -A over five 1 ns samples, flanked by zeros,
        // integrates to A * 5 ns once the linear edges are included
        let amplitude = 0.02;
        let mut samples = Array2::<Real>::zeros((1, 12));
        samples.slice_mut(s![.., 3..8]).fill(-amplitude);
        let waveforms = set(samples, 1.0);

        let window = IntegrationWindow { start: 0, stop: 10 };
        let charges = integrate_charges(&waveforms, &window);
        assert_eq!(charges.len(), 1);
        assert_approx_eq!(charges[0], amplitude * 5.0 * 1000.0 / 50.0, 1e-12);
    }

    #[test]
    fn sample_spacing_is_respected() {
        let amplitude = 0.5;
        let mut samples = Array2::<Real>::zeros((1, 40));
        samples.slice_mut(s![.., 10..30]).fill(-amplitude);
        let waveforms = set(samples, 0.25);

        let charges = integrate_charges(&waveforms, &IntegrationWindow { start: 0, stop: 38 });
        assert_approx_eq!(charges[0], amplitude * 5.0 * 1000.0 / 50.0, 1e-9);
    }

    #[test]
    fn stop_is_exclusive() {
        let waveforms = set(array![[0.0, -1.0, -1.0, -1.0, 0.0]], 1.0);
        // Samples 1 and 2 only
        let charges = integrate_charges(&waveforms, &IntegrationWindow { start: 1, stop: 3 });
        assert_approx_eq!(charges[0], 1.0 * 1000.0 / 50.0);
    }

    #[test]
    fn empty_window_is_zero() {
        let waveforms = set(
            array![[0.0, -1.0, -2.0, -1.0, 0.0], [0.5, 0.5, 0.5, 0.5, 0.5]],
            1.0,
        );
        for start in 0..4 {
            let window = IntegrationWindow { start, stop: start };
            let charges = integrate_charges(&waveforms, &window);
            assert_eq!(charges, vec![0.0, 0.0]);
        }
    }

    #[test]
    fn one_charge_per_event() {
        let waveforms = set(Array2::from_elem((17, 30), -0.01), 1.0);
        let charges = integrate_charges(&waveforms, &IntegrationWindow { start: 2, stop: 12 });
        assert_eq!(charges.len(), 17);
        for charge in charges {
            assert_approx_eq!(charge, 0.01 * 9.0 * 1000.0 / 50.0);
        }
    }
}
