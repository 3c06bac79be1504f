//! Raster loading and classification module
//!
//! This module turns image bytes into an RGBA raster and answers, per pixel,
//! whether that pixel is part of the stain.

mod loader;
mod image_loader;
mod classifier;
mod perimeter;
pub mod types;


pub use loader::RasterLoader;
pub use image_loader::ImageRasterLoader;
pub use classifier::{is_in_stain, STAIN_CHANNEL_VALUE};
pub use perimeter::stain_perimeter;
pub use types::{Raster, RasterInfo};
