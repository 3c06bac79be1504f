//! Monte Carlo estimation module
//!
//! Samples random points over a raster, classifies them, and turns the
//! in-stain ratio into an area estimate and a calculation record.

mod estimator;
mod sampler;
mod timing;
pub mod types;


pub use estimator::MonteCarloEstimator;
pub use sampler::{PointSampler, RandomSampler};
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{
    CalculationRecord, EstimationConfig, EstimationConfigBuilder, EstimationReport, SamplePoint,
};
