use rand::Rng;
use rand_distr::{Distribution, Normal, NormalError};
use scope_charge_common::Real;

/// Zero-mean Gaussian noise added to every sample.
#[derive(Clone, Debug)]
pub(crate) struct NoiseSource {
    normal: Normal<Real>,
}

impl NoiseSource {
    pub(crate) fn new(sd: Real) -> Result<Self, NormalError> {
        Ok(Self {
            normal: Normal::new(0.0, sd)?,
        })
    }

    pub(crate) fn noisify<R: Rng>(&self, value: Real, rng: &mut R) -> Real {
        value + self.normal.sample(rng)
    }
}
