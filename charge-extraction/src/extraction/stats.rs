//! Order statistics over unsorted samples, with linear interpolation between order
//! statistics. NaN samples are skipped.
use super::Real;
use ndarray::Array1;
use ndarray_stats::{Quantile1dExt, interpolate::Linear};
use noisy_float::types::{N64, n64};

fn samples(values: &[Real]) -> Array1<N64> {
    values.iter().copied().filter_map(N64::try_new).collect()
}

/// The `q`th quantile (`0 <= q <= 1`). NaN if there are no values.
pub(crate) fn quantile(values: &[Real], q: Real) -> Real {
    samples(values)
        .quantile_mut(n64(q), &Linear)
        .map_or(Real::NAN, N64::raw)
}

/// Interquartile range: 75th percentile minus 25th percentile.
pub(crate) fn interquartile_range(values: &[Real]) -> Real {
    let mut samples = samples(values);
    let upper = samples.quantile_mut(n64(0.75), &Linear);
    let lower = samples.quantile_mut(n64(0.25), &Linear);
    match (upper, lower) {
        (Ok(upper), Ok(lower)) => (upper - lower).raw(),
        _ => Real::NAN,
    }
}

/// The middle value, or the mean of the two middle values for an even count.
pub(crate) fn median(values: &[Real]) -> Real {
    quantile(values, 0.5)
}
