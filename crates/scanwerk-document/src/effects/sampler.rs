// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Random parameter draws shared by the batch driver and the effect recipes.

use rand::{Rng, RngCore};
use scanwerk_core::error::Result;
use scanwerk_core::{Intensity, IntensityRange};

/// Draws one intensity per effect invocation from a closed range.
///
/// The sampler holds no generator of its own: every draw advances the
/// caller's random source, so two effects applied to the same image get two
/// independent intensities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSampler {
    range: IntensityRange,
}

impl ParameterSampler {
    pub fn new(range: IntensityRange) -> Result<Self> {
        range.validate()?;
        Ok(Self { range })
    }

    /// Sampler over the batch range [0.4, 1.6].
    pub fn batch() -> Self {
        Self {
            range: IntensityRange::BATCH,
        }
    }

    /// Draw an intensity uniformly from the range, bounds included.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Result<Intensity> {
        Intensity::new(uniform_between(rng, self.range.min, self.range.max))
    }
}

/// Uniform draw from the closed interval between `a` and `b`, in either order.
pub fn uniform_between(rng: &mut dyn RngCore, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi {
        return lo;
    }
    rng.random_range(lo..=hi)
}

/// Uniform integer in `lo..hi`; `lo` when the range is empty.
pub fn uniform_int(rng: &mut dyn RngCore, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let sampler = ParameterSampler::batch();
        for _ in 0..1000 {
            let value = sampler.sample(&mut rng).unwrap().value();
            assert!(IntensityRange::BATCH.contains(value), "{value}");
        }
    }

    #[test]
    fn consecutive_samples_differ() {
        let mut rng = StdRng::seed_from_u64(2);
        let sampler = ParameterSampler::batch();
        let draws: Vec<f32> = (0..3).map(|_| sampler.sample(&mut rng).unwrap().value()).collect();
        assert_ne!(draws[0], draws[1]);
        assert_ne!(draws[1], draws[2]);
    }

    #[test]
    fn same_seed_same_draws() {
        let sampler = ParameterSampler::batch();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(sampler.sample(&mut a).unwrap(), sampler.sample(&mut b).unwrap());
        }
    }

    #[test]
    fn degenerate_and_reversed_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(uniform_between(&mut rng, 0.7, 0.7), 0.7);
        let low = 0.06_f32 * 0.2;
        for _ in 0..100 {
            let v = uniform_between(&mut rng, low, 0.02);
            assert!((low..=0.02).contains(&v), "{v}");
        }
        assert_eq!(uniform_int(&mut rng, 3, 3), 3);
        assert_eq!(uniform_int(&mut rng, 3, 1), 3);
    }

    #[test]
    fn rejects_invalid_range() {
        assert!(ParameterSampler::new(IntensityRange { min: 1.0, max: 0.2 }).is_err());
        let fixed = ParameterSampler::new(IntensityRange { min: 1.0, max: 1.0 }).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(fixed.sample(&mut rng).unwrap().value(), 1.0);
    }
}
