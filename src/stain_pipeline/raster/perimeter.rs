use crate::stain_pipeline::raster::classifier::is_in_stain;
use crate::stain_pipeline::raster::types::Raster;

/// Length of the stain boundary in pixel edges.
///
/// Counts every unit edge between a stain pixel and either a background
/// pixel or the image border, using 4-connectivity. A lone stain pixel has
/// a perimeter of 4; a full `w x h` stain has `2 * (w + h)`.
pub fn stain_perimeter(raster: &Raster) -> u64 {
    let (width, height) = (raster.width(), raster.height());
    let mut edges = 0u64;

    for y in 0..height {
        for x in 0..width {
            if !is_in_stain(raster, x, y) {
                continue;
            }

            let left = x > 0 && is_in_stain(raster, x - 1, y);
            let right = is_in_stain(raster, x + 1, y);
            let up = y > 0 && is_in_stain(raster, x, y - 1);
            let down = is_in_stain(raster, x, y + 1);

            edges += [left, right, up, down].iter().filter(|n| !**n).count() as u64;
        }
    }

    edges
}
