use super::{
    Real,
    pulse_selection::{PulseSelection, event_minimum},
};
use crate::parameters::CrossingPolicy;
use ndarray::ArrayView1;
use tracing::warn;

/// The fraction of an event's minimum that its waveform must drop below to register a crossing.
pub(crate) const CROSSING_FRACTION: Real = 0.4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Crossing {
    /// The first sample below the threshold.
    Found { time: Real },
    /// No sample dropped below the threshold. `time` is the first value of the time axis.
    NotFound { time: Real },
}

impl Crossing {
    pub(crate) fn time(&self) -> Real {
        match self {
            Crossing::Found { time } | Crossing::NotFound { time } => *time,
        }
    }

    pub(crate) fn is_found(&self) -> bool {
        matches!(self, Crossing::Found { .. })
    }
}

/// Scans `event` from the start for the first sample strictly below `fraction` of the
/// event's minimum. No interpolation is done between samples.
pub(crate) fn find_crossing(event: ArrayView1<Real>, time: &[Real], fraction: Real) -> Crossing {
    let threshold = fraction * event_minimum(event);
    match event.iter().position(|&value| value < threshold) {
        Some(index) => Crossing::Found {
            time: time.get(index).copied().unwrap_or(Real::NAN),
        },
        None => Crossing::NotFound {
            time: time.first().copied().unwrap_or(Real::NAN),
        },
    }
}

#[tracing::instrument(skip_all, level = "trace", fields(num_events = selection.len()))]
pub(crate) fn extract_crossings(selection: &PulseSelection, time: &[Real]) -> Vec<Crossing> {
    selection
        .events()
        .iter()
        .map(|event| find_crossing(event.view(), time, CROSSING_FRACTION))
        .collect()
}

/// The crossing times used to position the integration window.
pub(crate) fn crossing_times(crossings: &[Crossing], policy: CrossingPolicy) -> Vec<Real> {
    let all = || crossings.iter().map(Crossing::time).collect::<Vec<_>>();
    match policy {
        CrossingPolicy::Preserve => all(),
        CrossingPolicy::Discard => {
            let found: Vec<_> = crossings
                .iter()
                .filter(|crossing| crossing.is_found())
                .map(Crossing::time)
                .collect();
            if found.is_empty() && !crossings.is_empty() {
                warn!("No event crossed its threshold, using the first time of each event");
                all()
            } else {
                found
            }
        }
    }
}
