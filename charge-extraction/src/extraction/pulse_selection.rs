use super::Real;
use ndarray::{ArrayView1, ArrayView2, Axis};
use ndarray_stats::QuantileExt;

/// The most negative sample of an event, skipping NaN; NaN if the event has no samples.
pub(crate) fn event_minimum(event: ArrayView1<Real>) -> Real {
    *event.min_skipnan()
}

/// Marks, for each event, whether it contains a pulse.
/// An event is pulsed if its minimum is below `-threshold * noise_scale`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PulseMask(Vec<bool>);

impl PulseMask {
    pub(crate) fn new(waveforms: ArrayView2<Real>, noise_scale: Real, threshold: Real) -> Self {
        let level = -threshold * noise_scale;
        Self(
            waveforms
                .axis_iter(Axis(0))
                .map(|event| event_minimum(event) < level)
                .collect(),
        )
    }

    pub(crate) fn num_pulsed(&self) -> usize {
        self.0.iter().filter(|&&pulsed| pulsed).count()
    }

    /// Applies the mask to `waveforms`, the same set the mask was built from.
    /// If no event is pulsed the mask is not applied and every event is kept.
    pub(crate) fn select<'a>(&self, waveforms: ArrayView2<'a, Real>) -> PulseSelection<'a> {
        let events =
            (0..waveforms.nrows()).map(move |i| waveforms.index_axis_move(Axis(0), i));
        if self.num_pulsed() == 0 {
            PulseSelection::Unfiltered(events.collect())
        } else {
            PulseSelection::Filtered(
                events
                    .zip(&self.0)
                    .filter_map(|(event, &pulsed)| pulsed.then_some(event))
                    .collect(),
            )
        }
    }
}

/// The events used to resolve a channel's timing.
#[derive(Debug)]
pub(crate) enum PulseSelection<'a> {
    /// Only the pulsed events.
    Filtered(Vec<ArrayView1<'a, Real>>),
    /// Every event, because none were pulsed.
    Unfiltered(Vec<ArrayView1<'a, Real>>),
}

impl<'a> PulseSelection<'a> {
    pub(crate) fn events(&self) -> &[ArrayView1<'a, Real>] {
        match self {
            PulseSelection::Filtered(events) | PulseSelection::Unfiltered(events) => events,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.events().len()
    }

    pub(crate) fn is_unfiltered(&self) -> bool {
        matches!(self, PulseSelection::Unfiltered(_))
    }
}
