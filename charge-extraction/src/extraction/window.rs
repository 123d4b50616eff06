use super::{Real, stats::median};
use scope_charge_common::SourceKind;
use serde::Serialize;

/// How far, in ns, the integration window extends either side of the median crossing time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WindowMargins {
    pub(crate) left: Real,
    pub(crate) right: Real,
}

impl WindowMargins {
    pub(crate) fn for_source(source: SourceKind) -> Self {
        match source {
            SourceKind::Generic => Self {
                left: 1.0,
                right: 10.0,
            },
            SourceKind::LongDecay => Self {
                left: 10.0,
                right: 125.0,
            },
        }
    }
}

/// Indices into a channel's time axis, shared by every event of the channel.
/// Always satisfies `start <= stop <= num_samples - 2`; integration uses `start..stop`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct IntegrationWindow {
    pub(crate) start: usize,
    pub(crate) stop: usize,
}

impl IntegrationWindow {
    /// Centres the window on the median crossing time.
    #[tracing::instrument(skip_all, level = "trace", fields(num_crossings = crossing_times.len()))]
    pub(crate) fn resolve(crossing_times: &[Real], time: &[Real], margins: &WindowMargins) -> Self {
        let centre = median(crossing_times);
        let start = time.partition_point(|&t| t < centre - margins.left);
        let stop = time.partition_point(|&t| t < centre + margins.right);
        Self::clamped(start, stop, time.len())
    }

    fn clamped(start: usize, stop: usize, num_samples: usize) -> Self {
        // The final sample is kept back as the exclusive upper bound
        let stop = stop.min(num_samples.saturating_sub(2));
        Self {
            start: start.min(stop),
            stop,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.stop - self.start
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The times of the first and last samples used for integration.
    pub(crate) fn time_span(&self, time: &[Real]) -> Option<(Real, Real)> {
        let last = self.stop.checked_sub(1).filter(|&last| last >= self.start)?;
        Some((*time.get(self.start)?, *time.get(last)?))
    }
}
