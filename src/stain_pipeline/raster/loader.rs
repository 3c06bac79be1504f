use std::path::Path;

use async_trait::async_trait;

use crate::stain_pipeline::common::error::{Result, StainError};
use crate::stain_pipeline::raster::types::Raster;

#[async_trait]
pub trait RasterLoader: Send + Sync {
    async fn load(&self, data: Vec<u8>) -> Result<Raster>;

    async fn load_file(&self, path: &Path) -> Result<Raster> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StainError::InputRead(format!("{}: {}", path.display(), e)))?;
        self.load(data).await
    }
}
