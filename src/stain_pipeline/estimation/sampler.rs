use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::stain_pipeline::common::error::{Result, StainError};
use crate::stain_pipeline::estimation::types::SamplePoint;

/// Source of sample coordinates for the estimator.
pub trait PointSampler {
    /// Draws one point with `x` in `[0, width)` and `y` in `[0, height)`.
    fn sample(&mut self, width: usize, height: usize) -> Result<SamplePoint>;
}

/// Uniform sampler backed by `StdRng`. Each coordinate is an independent
/// draw, x first.
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl PointSampler for RandomSampler {
    fn sample(&mut self, width: usize, height: usize) -> Result<SamplePoint> {
        if width == 0 || height == 0 {
            return Err(StainError::InvalidInput(format!(
                "cannot sample an empty {}x{} box",
                width, height
            )));
        }

        let x = self.rng.gen_range(0..width);
        let y = self.rng.gen_range(0..height);
        Ok(SamplePoint { x, y })
    }
}
