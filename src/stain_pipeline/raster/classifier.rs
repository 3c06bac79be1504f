use crate::stain_pipeline::raster::types::Raster;

/// Channel value a stain pixel must hold in red, green and blue.
pub const STAIN_CHANNEL_VALUE: u8 = u8::MAX;

/// Whether the pixel at (x, y) belongs to the stain.
///
/// Input is expected to be a binary mask: white pixels are stain, anything
/// else is background. Alpha is ignored and out-of-range coordinates are
/// never stain.
#[inline]
pub fn is_in_stain(raster: &Raster, x: usize, y: usize) -> bool {
    let Some(offset) = raster.offset(x, y) else {
        return false;
    };

    match raster.as_bytes().get(offset..offset + 3) {
        Some([r, g, b]) => {
            *r == STAIN_CHANNEL_VALUE && *g == STAIN_CHANNEL_VALUE && *b == STAIN_CHANNEL_VALUE
        }
        _ => false,
    }
}
