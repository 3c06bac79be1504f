use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::stain_pipeline::{
    common::error::Result,
    estimation::{CalculationRecord, EstimationConfig, MonteCarloEstimator},
    raster::{ImageRasterLoader, Raster, RasterInfo, RasterLoader},
    session::notifier::{Notifier, NoopNotifier},
    storage::ResultStore,
};

/// Ties the loader, the estimator and the history together for a caller.
///
/// Holds at most one live raster; every load replaces it wholesale.
/// Records already produced keep their own image snapshot.
pub struct StainAreaSession<L: RasterLoader = ImageRasterLoader> {
    loader: L,
    estimator: MonteCarloEstimator,
    store: Arc<ResultStore>,
    notifier: Arc<dyn Notifier>,
    current: RwLock<Option<Arc<Raster>>>,
}

impl StainAreaSession<ImageRasterLoader> {
    pub fn new(config: EstimationConfig, store: Arc<ResultStore>) -> Self {
        Self::with_custom(ImageRasterLoader, config, store, Arc::new(NoopNotifier))
    }
}

impl<L: RasterLoader> StainAreaSession<L> {
    pub fn with_custom(
        loader: L,
        config: EstimationConfig,
        store: Arc<ResultStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            loader,
            estimator: MonteCarloEstimator::new(config),
            store,
            notifier,
            current: RwLock::new(None),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Decodes `data` and makes it the current raster.
    ///
    /// A failed load also drops the previous raster, so no estimation can
    /// run against a stale image.
    #[instrument(skip(self, data), fields(input_size = data.len()))]
    pub async fn load_image(&self, data: Vec<u8>) -> Result<RasterInfo> {
        let loaded = self.loader.load(data).await;
        self.install(loaded).await
    }

    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn load_image_file(&self, path: impl AsRef<Path>) -> Result<RasterInfo> {
        let loaded = self.loader.load_file(path.as_ref()).await;
        self.install(loaded).await
    }

    async fn install(&self, loaded: Result<Raster>) -> Result<RasterInfo> {
        let mut current = self.current.write().await;
        match loaded {
            Ok(raster) => {
                let info = raster.info();
                *current = Some(Arc::new(raster));
                info!(width = info.width, height = info.height, "Image loaded");
                self.notifier.success("Image loaded");
                Ok(info)
            }
            Err(e) => {
                *current = None;
                self.notifier.error(&format!("Could not load image: {}", e));
                Err(e)
            }
        }
    }

    pub async fn clear_image(&self) {
        *self.current.write().await = None;
    }

    pub async fn current_raster(&self) -> Option<Arc<Raster>> {
        self.current.read().await.clone()
    }

    pub async fn image_dimensions(&self) -> Option<RasterInfo> {
        self.current.read().await.as_ref().map(|r| r.info())
    }

    pub async fn is_image_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Estimates the stain area of the current raster and records the run.
    ///
    /// # Errors
    ///
    /// * [`StainError::InvalidInput`](crate::stain_pipeline::StainError::InvalidInput)
    ///   - no image loaded or a bad sample count; history is untouched
    /// * [`StainError::Persistence`](crate::stain_pipeline::StainError::Persistence)
    ///   - the record is in the in-memory history but was not written out
    #[instrument(skip(self))]
    pub async fn calculate_area(&self, sample_count: usize) -> Result<CalculationRecord> {
        let raster = self.current_raster().await;

        let report = match self.estimator.estimate_with_report(raster.as_deref(), sample_count) {
            Ok(report) => report,
            Err(e) => {
                self.notifier.error(&format!("Area calculation failed: {}", e));
                return Err(e);
            }
        };
        report.timings.log_summary();

        let record = report.record;
        if let Err(e) = self.store.append(record.clone()).await {
            self.notifier.error(&format!("Calculation could not be saved: {}", e));
            return Err(e);
        }

        self.notifier.success(&format!(
            "Area calculated: {:.2} square pixels",
            record.stain_area
        ));
        Ok(record)
    }

    pub fn history(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn estimator(&self) -> &MonteCarloEstimator {
        &self.estimator
    }
}
