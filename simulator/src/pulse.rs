use scope_charge_common::Real;

/// A negative-going pulse `-coef * (exp(-t/decay) - exp(-t/rise))` for `t >= start`.
/// `coef` is chosen so the pulse reaches `-amplitude` at its peak.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BiExpPulse {
    start: Real,
    rise: Real,
    decay: Real,
    coef: Real,
}

impl BiExpPulse {
    /// Requires `0 < rise < decay`.
    pub(crate) fn new(start: Real, rise: Real, decay: Real, amplitude: Real) -> Self {
        Self {
            start,
            rise,
            decay,
            coef: amplitude / Self::unit_peak(rise, decay),
        }
    }

    /// The peak of `exp(-t/decay) - exp(-t/rise)`, reached at
    /// `t = rise * decay * ln(decay / rise) / (decay - rise)`.
    fn unit_peak(rise: Real, decay: Real) -> Real {
        let peak_time = rise * decay * Real::ln(decay / rise) / (decay - rise);
        Real::exp(-peak_time / decay) - Real::exp(-peak_time / rise)
    }

    pub(crate) fn value_at(&self, time: Real) -> Real {
        if time < self.start {
            Real::default()
        } else {
            let time = time - self.start;
            -self.coef * (Real::exp(-time / self.decay) - Real::exp(-time / self.rise))
        }
    }
}
