//! Stain area estimation pipeline
//!
//! This module provides Monte Carlo estimation of the stain area in a binary
//! image, with separate modules for raster loading, estimation, result
//! storage and the session that ties them together.

pub mod raster;
pub mod estimation;
pub mod storage;
pub mod session;
pub mod common;

pub use common::{
    Result,
    StainError,
};

pub use raster::{
    ImageRasterLoader,
    Raster,
    RasterInfo,
    RasterLoader,
    is_in_stain,
    stain_perimeter,
};

pub use estimation::{
    CalculationRecord,
    EstimationConfig,
    EstimationConfigBuilder,
    EstimationReport,
    MonteCarloEstimator,
    PointSampler,
    RandomSampler,
};

pub use storage::{
    FileKeyValueStore,
    HistorySummary,
    KeyValueStore,
    MemoryKeyValueStore,
    ResultStore,
};

pub use session::{
    NoopNotifier,
    Notifier,
    StainAreaSession,
    TracingNotifier,
};
