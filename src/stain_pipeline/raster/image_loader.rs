//! Raster loader implementation using the image library.
//!
//! Any format the `image` crate was built with (PNG, JPEG, BMP, TIFF) is
//! decoded and expanded to RGBA8 at its native size. Decoding is CPU bound,
//! so it runs on tokio's blocking pool and the caller only awaits the result.

use async_trait::async_trait;
use tracing::debug;

use crate::stain_pipeline::common::error::{Result, StainError};
use crate::stain_pipeline::raster::loader::RasterLoader;
use crate::stain_pipeline::raster::types::Raster;

/// Raster loader that decodes with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRasterLoader;

impl ImageRasterLoader {
    /// Decodes `data` synchronously.
    ///
    /// # Errors
    ///
    /// * [`StainError::Decode`] - empty input or unrecognized/corrupt bytes
    /// * [`StainError::PixelAccess`] - the decoded image has no usable pixels
    pub fn decode(data: &[u8]) -> Result<Raster> {
        debug!("Decoding image, {} bytes", data.len());

        if data.is_empty() {
            return Err(StainError::Decode("input image data is empty".to_string()));
        }

        let decoded =
            image::load_from_memory(data).map_err(|e| StainError::Decode(e.to_string()))?;

        // The decoded image is dropped at the end of this scope; only the
        // RGBA copy survives in the raster.
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        debug!("Decoded image: {}x{}", width, height);

        Raster::from_rgba(width as usize, height as usize, rgba.into_raw())
    }
}

#[async_trait]
impl RasterLoader for ImageRasterLoader {
    async fn load(&self, data: Vec<u8>) -> Result<Raster> {
        tokio::task::spawn_blocking(move || Self::decode(&data))
            .await
            .map_err(|e| StainError::PixelAccess(format!("decode worker failed: {}", e)))?
    }
}
