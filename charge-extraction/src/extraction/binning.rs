use super::{Real, stats::interquartile_range};
use ndarray::{ArrayView1, array};
use ndarray_stats::{
    QuantileExt,
    histogram::{self, Bins, Edges, Grid},
};
use noisy_float::types::N64;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

/// Scales the Freedman-Diaconis bin width down, giving finer bins for the peak fit.
const BIN_WIDTH_DAMPING: Real = 0.5;

/// More bins than this are treated as a degenerate spread.
const MAX_BINS: Real = 100_000.0;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum HistogramError {
    #[error("Insufficient spread to build a histogram: bin width {width}, {num_edges} edges")]
    InsufficientSpread { width: Real, num_edges: usize },
}

/// Evenly spaced bin edges covering a set of values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct BinEdges {
    width: Real,
    edges: Vec<Real>,
}

impl BinEdges {
    /// Bin width `0.5 * IQR / n^(1/3)`, with edges from the smallest value until the largest
    /// is covered. A width which is not positive, or which would need more than [MAX_BINS]
    /// bins, gives the single edge `[min]`; this is not an error here, but [Histogram::new]
    /// refuses it.
    pub(crate) fn resolve(values: &[Real]) -> Self {
        let width = BIN_WIDTH_DAMPING * interquartile_range(values)
            / (values.len() as Real).cbrt();
        let values = ArrayView1::from(values);
        let (Ok(&min), Ok(&max)) = (values.min(), values.max()) else {
            return Self {
                width,
                edges: Vec::new(),
            };
        };

        let num_bins = ((max - min) / width).ceil().max(1.0);
        let edges = if width.is_finite() && width > 0.0 && num_bins <= MAX_BINS {
            let mut edges: Vec<Real> = (0..=num_bins as usize)
                .map(|bin| min + bin as Real * width)
                .collect();
            if let Some(last) = edges.last_mut() {
                *last = last.max(max);
            }
            edges
        } else {
            debug!("Bin width {width} cannot cover [{min}, {max}]");
            vec![min]
        };
        Self { width, edges }
    }

    pub(crate) fn width(&self) -> Real {
        self.width
    }

    pub(crate) fn edges(&self) -> &[Real] {
        &self.edges
    }
}

/// Counts of values per bin. Every bin is closed on the left, the last is also closed on
/// the right.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Histogram {
    counts: Vec<usize>,
}

impl Histogram {
    pub(crate) fn new(bins: &BinEdges, values: &[Real]) -> Result<Self, HistogramError> {
        let insufficient_spread = || HistogramError::InsufficientSpread {
            width: bins.width,
            num_edges: bins.edges.len(),
        };
        if !bins.width.is_finite() || bins.width <= 0.0 {
            return Err(insufficient_spread());
        }
        let (Some(&last_lower), Some(&upper)) = (
            bins.edges.len().checked_sub(2).and_then(|i| bins.edges.get(i)),
            bins.edges.last(),
        ) else {
            return Err(insufficient_spread());
        };
        let edges = bins
            .edges
            .iter()
            .copied()
            .map(N64::try_new)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(insufficient_spread)?;

        let mut counter =
            histogram::Histogram::new(Grid::from(vec![Bins::new(Edges::from(edges))]));
        for value in values {
            // The top edge belongs to the last bin
            let value = if *value == upper { last_lower } else { *value };
            let Some(value) = N64::try_new(value) else {
                continue;
            };
            if counter.add_observation(&array![value]).is_err() {
                trace!("No bin for {value}");
            }
        }
        Ok(Self {
            counts: counter.counts().iter().copied().collect(),
        })
    }

    pub(crate) fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub(crate) fn into_counts(self) -> Vec<usize> {
        self.counts
    }
}
