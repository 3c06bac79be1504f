use tracing::{debug, info, info_span, instrument, warn};

use crate::stain_pipeline::{
    common::error::{Result, StainError},
    estimation::{
        sampler::{PointSampler, RandomSampler},
        timing::{PipelineTimings, Timer},
        types::{CalculationRecord, EstimationConfig, EstimationReport},
    },
    raster::{Raster, is_in_stain},
};

/// Monte Carlo stain area estimator.
///
/// Draws uniform points over the raster's bounding box and scales the share
/// that lands on stain pixels by the box area.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloEstimator {
    config: EstimationConfig,
}

impl MonteCarloEstimator {
    pub fn new(config: EstimationConfig) -> Self {
        Self { config }
    }

    fn validate(&self, sample_count: usize) -> Result<()> {
        if sample_count == 0 {
            return Err(StainError::non_positive_samples());
        }

        if let Some(max) = self.config.max_sample_count {
            if sample_count > max {
                return Err(StainError::InvalidInput(format!(
                    "sample count {} exceeds maximum {}",
                    sample_count, max
                )));
            }
        }

        Ok(())
    }

    /// Runs one estimation and returns its record.
    ///
    /// # Errors
    ///
    /// [`StainError::InvalidInput`] when `raster` is `None`, when
    /// `sample_count` is zero, or when it exceeds the configured maximum.
    pub fn estimate(&self, raster: Option<&Raster>, sample_count: usize) -> Result<CalculationRecord> {
        self.estimate_with_report(raster, sample_count)
            .map(|report| report.record)
    }

    pub fn estimate_with_report(
        &self,
        raster: Option<&Raster>,
        sample_count: usize,
    ) -> Result<EstimationReport> {
        let mut sampler = RandomSampler::new(self.config.seed);
        self.estimate_with_sampler(raster, sample_count, &mut sampler)
    }

    /// Same as [`estimate_with_report`](Self::estimate_with_report) but
    /// draws points from `sampler`.
    ///
    /// A failed draw excludes that sample from the stain count without
    /// aborting the run; the area is still scaled by the requested count.
    #[instrument(skip(self, raster, sampler))]
    pub fn estimate_with_sampler<S: PointSampler>(
        &self,
        raster: Option<&Raster>,
        sample_count: usize,
        sampler: &mut S,
    ) -> Result<EstimationReport> {
        let raster = raster.ok_or_else(StainError::no_image_loaded)?;
        self.validate(sample_count)?;

        let mut timings = PipelineTimings::new();

        let timer = Timer::start("sample_points");
        let (points_in_stain, skipped_samples) = {
            let _span = info_span!(
                "sample_points",
                width = raster.width(),
                height = raster.height()
            )
            .entered();
            count_in_stain(raster, sample_count, sampler)
        };
        let (name, sampling) = timer.stop();
        timings.add_step(name, sampling);

        if skipped_samples > 0 {
            warn!(
                skipped = skipped_samples,
                requested = sample_count,
                "Samples excluded after failed draws"
            );
        }

        let image_url = if self.config.embed_image_snapshot {
            let timer = Timer::start("snapshot_image");
            // A missing snapshot only costs the history thumbnail, so the
            // run is still reported.
            let url = raster.to_data_url().unwrap_or_else(|e| {
                warn!(error = %e, "Image snapshot unavailable");
                String::new()
            });
            let (name, duration) = timer.stop();
            timings.add_step(name, duration);
            url
        } else {
            String::new()
        };

        let record = CalculationRecord::new(
            sample_count,
            points_in_stain,
            raster.area(),
            image_url,
            sampling.as_secs_f64() * 1000.0,
        );

        info!(
            id = %record.id,
            samples = sample_count,
            in_stain = points_in_stain,
            stain_area = record.stain_area,
            total_area = record.total_area,
            "Estimation complete"
        );

        Ok(EstimationReport {
            record,
            skipped_samples,
            timings,
        })
    }

    pub fn config(&self) -> &EstimationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EstimationConfig) {
        self.config = config;
    }
}

/// Returns `(in_stain, skipped)` over `sample_count` draws.
fn count_in_stain<S: PointSampler>(
    raster: &Raster,
    sample_count: usize,
    sampler: &mut S,
) -> (usize, usize) {
    let (width, height) = (raster.width(), raster.height());
    let mut in_stain = 0;
    let mut skipped = 0;

    for _ in 0..sample_count {
        match sampler.sample(width, height) {
            Ok(point) => {
                if is_in_stain(raster, point.x, point.y) {
                    in_stain += 1;
                }
            }
            Err(e) => {
                debug!(error = %e, "Sample draw failed");
                skipped += 1;
            }
        }
    }

    (in_stain, skipped)
}
