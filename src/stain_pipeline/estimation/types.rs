//! Estimation data types and configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stain_pipeline::estimation::timing::PipelineTimings;

/// A pixel coordinate drawn during one estimation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePoint {
    pub x: usize,
    pub y: usize,
}

/// Outcome of one completed Monte Carlo run.
///
/// Field names follow the persisted JSON layout (`numPoints`,
/// `pointsInStain`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Requested sample count
    pub num_points: usize,
    /// Samples that landed on a stain pixel
    pub points_in_stain: usize,
    /// Bounding-box area (width * height) in square pixels
    pub total_area: u64,
    /// Estimated stain area in square pixels
    pub stain_area: f64,
    /// PNG data URI of the source image, empty when snapshots are disabled
    pub image_url: String,
    /// Wall-clock time spent sampling
    #[serde(default)]
    pub processing_time_ms: f64,
}

impl CalculationRecord {
    pub fn new(
        num_points: usize,
        points_in_stain: usize,
        total_area: u64,
        image_url: String,
        processing_time_ms: f64,
    ) -> Self {
        let stain_area = if num_points == 0 {
            0.0
        } else {
            (points_in_stain as f64 / num_points as f64) * total_area as f64
        };

        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            num_points,
            points_in_stain,
            total_area,
            stain_area,
            image_url,
            processing_time_ms,
        }
    }

    /// Fraction of the bounding box covered by the stain, in [0, 1].
    pub fn coverage(&self) -> f64 {
        if self.total_area == 0 {
            return 0.0;
        }
        self.stain_area / self.total_area as f64
    }

    /// Checks the counting and area invariants. Used to reject persisted
    /// records that were edited or truncated by hand.
    pub fn is_consistent(&self) -> bool {
        !self.id.is_empty()
            && self.num_points > 0
            && self.points_in_stain <= self.num_points
            && self.stain_area.is_finite()
            && self.stain_area >= 0.0
            && self.stain_area <= self.total_area as f64
    }
}

/// A record together with run diagnostics that are not persisted.
#[derive(Debug, Clone)]
pub struct EstimationReport {
    pub record: CalculationRecord,
    /// Samples whose draw failed and were left out of the count
    pub skipped_samples: usize,
    pub timings: PipelineTimings,
}

impl EstimationReport {
    /// Samples that were actually drawn and classified.
    pub fn effective_samples(&self) -> usize {
        self.record.num_points - self.skipped_samples
    }
}

/// Configuration for Monte Carlo estimation
#[derive(Debug, Clone)]
pub struct EstimationConfig {
    /// Upper bound on the sample count of a single run (no bound when None)
    pub max_sample_count: Option<usize>,
    /// Whether records carry a PNG data URI of the source image
    pub embed_image_snapshot: bool,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when None
    pub seed: Option<u64>,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            max_sample_count: None,
            embed_image_snapshot: true,
            seed: None,
        }
    }
}

impl EstimationConfig {
    pub fn builder() -> EstimationConfigBuilder {
        EstimationConfigBuilder::default()
    }
}

/// Builder for EstimationConfig
#[derive(Default)]
pub struct EstimationConfigBuilder {
    max_sample_count: Option<Option<usize>>,
    embed_image_snapshot: Option<bool>,
    seed: Option<Option<u64>>,
}

impl EstimationConfigBuilder {
    pub fn max_sample_count(mut self, max: Option<usize>) -> Self {
        self.max_sample_count = Some(max);
        self
    }

    pub fn embed_image_snapshot(mut self, enable: bool) -> Self {
        self.embed_image_snapshot = Some(enable);
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> EstimationConfig {
        let default = EstimationConfig::default();
        EstimationConfig {
            max_sample_count: self.max_sample_count.unwrap_or(default.max_sample_count),
            embed_image_snapshot: self
                .embed_image_snapshot
                .unwrap_or(default.embed_image_snapshot),
            seed: self.seed.unwrap_or(default.seed),
        }
    }
}
