//! Raster image data types

use std::sync::OnceLock;

use base64::{Engine as _, engine::general_purpose};
use image::ImageEncoder;

use crate::stain_pipeline::common::error::{Result, StainError};

/// Number of bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Immutable snapshot of a decoded image as an RGBA8 buffer.
///
/// The buffer length is always `width * height * 4`; the constructor
/// rejects anything else, so every accessor can rely on it.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
    data_url: OnceLock<String>,
}

/// Dimensions of a loaded raster, handed back to callers after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterInfo {
    pub width: usize,
    pub height: usize,
}

impl Raster {
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StainError::PixelAccess(format!(
                "image has no pixels: width={}, height={}",
                width, height
            )));
        }

        let expected = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(CHANNELS))
            .ok_or_else(|| {
                StainError::PixelAccess(format!("image too large: {}x{}", width, height))
            })?;

        if data.len() != expected {
            return Err(StainError::PixelAccess(format!(
                "pixel buffer holds {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            data,
            data_url: OnceLock::new(),
        })
    }

    /// Builds a raster by evaluating `f` for every pixel, row by row.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> [u8; 4],
    ) -> Result<Self> {
        let mut data = Vec::with_capacity(width.saturating_mul(height).saturating_mul(CHANNELS));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::from_rgba(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn info(&self) -> RasterInfo {
        RasterInfo {
            width: self.width,
            height: self.height,
        }
    }

    /// Bounding-box area in square pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of the pixel at (x, y), or `None` outside the image.
    pub fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) * CHANNELS)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let px = self.data.get(offset..offset + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// PNG data URI of the raster, encoded once and cached.
    pub fn to_data_url(&self) -> Result<String> {
        if let Some(url) = self.data_url.get() {
            return Ok(url.clone());
        }

        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(
                &self.data,
                self.width as u32,
                self.height as u32,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| StainError::PixelAccess(format!("snapshot encoding failed: {}", e)))?;

        let url = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&png)
        );
        let _ = self.data_url.set(url.clone());
        Ok(url)
    }
}
