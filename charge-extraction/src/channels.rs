//! Extracts the charges of every event on a channel.
use crate::{
    extraction::{
        BinEdges, Histogram, IntegrationWindow, PulseMask, Real, baseline_corrected,
        extract_crossings, integrate_charges, noise_scale, timing::crossing_times,
    },
    parameters::ExtractionParameters,
};
use scope_charge_common::{
    Channel, SourceKind,
    capture::{CaptureError, ChannelCapture, WaveformSet},
};
use serde::Serialize;
use tracing::{debug, warn};

/// Everything the charge sink needs for one channel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ChannelCharges {
    pub(crate) channel: Channel,
    pub(crate) source: SourceKind,
    pub(crate) noise_scale: Real,
    pub(crate) num_events: usize,
    pub(crate) num_pulsed: usize,
    /// True if no event was pulsed and timing was resolved from every event.
    pub(crate) unfiltered_selection: bool,
    pub(crate) missing_crossings: usize,
    pub(crate) window: IntegrationWindow,
    /// Times of the first and last integrated samples, absent for an empty window.
    pub(crate) window_span: Option<(Real, Real)>,
    pub(crate) charges: Vec<Real>,
    pub(crate) bins: BinEdges,
    /// Absent if the charges have insufficient spread to be histogrammed.
    pub(crate) histogram: Option<Vec<usize>>,
}

/// Runs the full extraction for one channel of a capture.
/// # Parameters
/// - capture: the channel's waveforms and time axis.
/// - parameters: settings to use for each stage.
#[tracing::instrument(skip_all, fields(channel = capture.channel, source = %capture.source, num_events, num_pulsed))]
pub(crate) fn extract_channel_charges(
    capture: &ChannelCapture,
    parameters: &ExtractionParameters,
) -> Result<ChannelCharges, CaptureError> {
    let waveforms = capture.waveform_set()?;
    let waveforms = if parameters.baseline_correction {
        baseline_corrected(&waveforms, parameters.baseline_width)
    } else {
        waveforms
    };
    Ok(extract_charges(
        capture.channel,
        capture.source,
        &waveforms,
        parameters,
    ))
}

pub(crate) fn extract_charges(
    channel: Channel,
    source: SourceKind,
    waveforms: &WaveformSet,
    parameters: &ExtractionParameters,
) -> ChannelCharges {
    let span = tracing::Span::current();
    span.record("num_events", waveforms.num_events());

    let noise_scale = noise_scale(waveforms, parameters.baseline_width);
    let mask = PulseMask::new(waveforms.samples(), noise_scale, parameters.pulse_threshold);
    span.record("num_pulsed", mask.num_pulsed());

    let selection = mask.select(waveforms.samples());
    if selection.is_unfiltered() {
        debug!("No pulsed events, resolving timing from all {} events", selection.len());
    }

    let crossings = extract_crossings(&selection, waveforms.time());
    let missing_crossings = crossings.iter().filter(|crossing| !crossing.is_found()).count();
    if missing_crossings > 0 {
        debug!("{missing_crossings} events never crossed their timing threshold");
    }

    let window = IntegrationWindow::resolve(
        &crossing_times(&crossings, parameters.crossing_policy),
        waveforms.time(),
        &parameters.margins(source),
    );
    if window.is_empty() {
        warn!("Integration window {window:?} is empty, every charge is zero");
    } else {
        debug!("Integration window: {window:?}");
    }

    let charges = integrate_charges(waveforms, &window);
    let bins = BinEdges::resolve(&charges);
    let histogram = match Histogram::new(&bins, &charges) {
        Ok(histogram) => {
            debug!(
                "{} bins of width {} pC",
                histogram.counts().len(),
                bins.width()
            );
            Some(histogram.into_counts())
        }
        Err(e) => {
            warn!("{e}");
            None
        }
    };

    ChannelCharges {
        channel,
        source,
        noise_scale,
        num_events: waveforms.num_events(),
        num_pulsed: mask.num_pulsed(),
        unfiltered_selection: selection.is_unfiltered(),
        missing_crossings,
        window,
        window_span: window.time_span(waveforms.time()),
        charges,
        bins,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::CrossingPolicy;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::{Array2, array};
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal, Poisson};
    use scope_charge_common::capture::TimeAxisDescriptor;

    fn three_event_set() -> WaveformSet {
        WaveformSet::try_new(
            array![
                [0.0, 0.0, -1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 0.0]
            ],
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn three_event_scenario() {
        let parameters = ExtractionParameters {
            baseline_width: 2.0,
            ..Default::default()
        };
        let result = extract_charges(1, SourceKind::Generic, &three_event_set(), &parameters);

        assert_eq!(result.noise_scale, 0.0);
        assert_eq!(result.num_pulsed, 1);
        assert!(!result.unfiltered_selection);
        assert_eq!(result.missing_crossings, 0);
        // Crossing at 2 ns, window [1 ns, 12 ns) clamped to the last usable index
        assert_eq!(result.window, IntegrationWindow { start: 1, stop: 3 });
        assert_eq!(result.charges.len(), 3);
        // Only the falling half of the dip lies inside the window
        assert_approx_eq!(result.charges[0], 0.5 * 1000.0 / 50.0);
        assert_eq!(result.charges[1], 0.0);
        assert_eq!(result.charges[2], 0.0);
    }

    #[test]
    fn no_pulses_uses_every_event() {
        let waveforms =
            WaveformSet::try_new(Array2::from_elem((6, 20), 0.01), (0..20).map(Real::from).collect())
                .unwrap();
        let result = extract_charges(2, SourceKind::Generic, &waveforms, &Default::default());

        assert_eq!(result.num_pulsed, 0);
        assert!(result.unfiltered_selection);
        assert_eq!(result.missing_crossings, 6);
        assert_eq!(result.charges.len(), 6);
        assert!(result.histogram.is_none());
    }

    #[test]
    fn discarding_missing_crossings_moves_the_window() {
        // The baseline spread of events 1 and 2 keeps every event unpulsed. Event 0 dips at
        // 60 ns, events 1 and 2 never go negative so never cross their thresholds.
        let mut samples = Array2::<Real>::zeros((3, 100));
        samples[[0, 60]] = -0.1;
        for event in 1..3 {
            for i in 0..100 {
                samples[[event, i]] = if i < 10 { (i % 2) as Real } else { 0.5 };
            }
        }
        let waveforms =
            WaveformSet::try_new(samples, (0..100).map(Real::from).collect()).unwrap();

        let preserve = extract_charges(0, SourceKind::Generic, &waveforms, &Default::default());
        assert!(preserve.unfiltered_selection);
        assert_eq!(preserve.missing_crossings, 2);
        assert_eq!(preserve.window, IntegrationWindow { start: 0, stop: 10 });

        let parameters = ExtractionParameters {
            crossing_policy: CrossingPolicy::Discard,
            ..Default::default()
        };
        let discard = extract_charges(0, SourceKind::Generic, &waveforms, &parameters);
        assert_eq!(discard.missing_crossings, 2);
        assert_eq!(discard.window, IntegrationWindow { start: 59, stop: 70 });
    }

    #[test]
    fn missing_crossings_in_unfiltered_selection() {
        let mut samples = Array2::<Real>::zeros((3, 100));
        samples[[0, 60]] = 0.5;
        let waveforms =
            WaveformSet::try_new(samples, (0..100).map(Real::from).collect()).unwrap();

        let result = extract_charges(0, SourceKind::Generic, &waveforms, &Default::default());
        assert!(result.unfiltered_selection);
        assert_eq!(result.missing_crossings, 3);
        assert_eq!(result.window, IntegrationWindow { start: 0, stop: 10 });
    }

    #[test]
    fn invalid_capture_is_an_error() {
        let capture = ChannelCapture {
            channel: 4,
            source: SourceKind::Generic,
            time_axis: TimeAxisDescriptor {
                origin: 0.0,
                increment: 1.0,
                samples: 3,
            },
            waveforms: vec![vec![0.0; 3], vec![0.0; 2]],
        };
        assert!(extract_channel_charges(&capture, &Default::default()).is_err());
    }

    #[test]
    fn baseline_correction_removes_offset() {
        let mut waveform = vec![0.2; 60];
        waveform[30] = -0.8;
        let capture = ChannelCapture {
            channel: 1,
            source: SourceKind::Generic,
            time_axis: TimeAxisDescriptor {
                origin: 0.0,
                increment: 1.0,
                samples: 60,
            },
            waveforms: vec![waveform],
        };
        let parameters = ExtractionParameters {
            baseline_correction: true,
            ..Default::default()
        };
        let result = extract_channel_charges(&capture, &parameters).unwrap();
        // A single -1 V sample at 1 ns spacing integrates to 1 V ns
        assert_approx_eq!(result.charges[0], 1000.0 / 50.0);
    }

    /// Simulated photoelectron spectrum: the mean charge should follow the mean number of
    /// photoelectrons per event.
    #[test]
    fn photoelectron_spectrum() {
        let mut rng = StdRng::seed_from_u64(42);
        let noise = Normal::new(0.0, 0.0005).unwrap();
        let photoelectrons = Poisson::new(2.0).unwrap();
        let single_pe_amplitude = 0.01;
        let increment = 0.25;
        let num_events = 400;
        let num_samples = 400;

        let mut samples = Array2::<Real>::zeros((num_events, num_samples));
        let mut expected = 0.0;
        for mut event in samples.rows_mut() {
            let count: Real = photoelectrons.sample(&mut rng);
            for (i, value) in event.iter_mut().enumerate() {
                let t = i as Real * increment;
                let pulse = if (40.0..42.0).contains(&t) {
                    -count * single_pe_amplitude
                } else {
                    0.0
                };
                *value = pulse + noise.sample(&mut rng);
            }
            expected += count * single_pe_amplitude * 2.0 * 1000.0 / 50.0;
        }
        let waveforms = WaveformSet::try_new(
            samples,
            (0..num_samples).map(|i| i as Real * increment).collect(),
        )
        .unwrap();

        let result = extract_charges(1, SourceKind::Generic, &waveforms, &Default::default());
        let mean = result.charges.iter().sum::<Real>() / num_events as Real;
        expected /= num_events as Real;

        assert!(result.num_pulsed > 0 && result.num_pulsed < num_events);
        assert_approx_eq!(mean, expected, 0.05 * expected);
        assert!(result.histogram.is_some());
        assert_eq!(
            result.histogram.unwrap().iter().sum::<usize>(),
            num_events
        );
    }
}
