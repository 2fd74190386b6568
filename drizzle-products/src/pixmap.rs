//! Dense pixel-to-pixel correspondence between two WCS models.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use drizzle_wcs::{PixelCoord, WcsError, WcsModel, WcsResult};
use tracing::debug;

/// Grid of shape `(height, width, 2)`: entry `(y, x)` holds the 0-based
/// `(x, y)` position in the target frame of source pixel `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMap {
    width: usize,
    height: usize,
    data: Vec<[f64; 2]>,
}

impl PixelMap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, 2)
    }

    pub fn get(&self, y: usize, x: usize) -> Option<[f64; 2]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    pub fn row(&self, y: usize) -> &[[f64; 2]] {
        let start = (y * self.width).min(self.data.len());
        let end = (start + self.width).min(self.data.len());
        &self.data[start..end]
    }

    pub fn as_slice(&self) -> &[[f64; 2]] {
        &self.data
    }

    /// Flattened `[x0, y0, x1, y1, ...]` in row-major order.
    pub fn to_flat(&self) -> Vec<f64> {
        self.data.iter().flat_map(|p| p.iter().copied()).collect()
    }
}

/// Maps every pixel of `source` into the pixel frame of `target`.
///
/// The target's distortion-inclusive inverse is used only when it carries a
/// distortion model; otherwise its linear inverse is applied.
pub fn compute_pixel_map<S, T>(source: &S, target: &T) -> WcsResult<PixelMap>
where
    S: WcsModel + Sync + ?Sized,
    T: WcsModel + Sync + ?Sized,
{
    let extent = source
        .extent()
        .ok_or_else(|| WcsError::missing_extent("source WCS does not define NAXIS1/NAXIS2"))?;
    if extent.is_empty() {
        return Err(WcsError::missing_extent(format!(
            "source extent {}x{} is empty",
            extent.width, extent.height
        )));
    }

    let full_inverse = target.supports_full_inverse_transform();
    debug!(
        width = extent.width,
        height = extent.height,
        full_inverse,
        "computing pixel map"
    );

    let rows = map_rows(source, target, extent.width, extent.height, full_inverse);

    let mut data = Vec::with_capacity(extent.len());
    for row in rows {
        data.extend(row?);
    }

    Ok(PixelMap {
        width: extent.width,
        height: extent.height,
        data,
    })
}

#[cfg(feature = "parallel")]
fn map_rows<S, T>(
    source: &S,
    target: &T,
    width: usize,
    height: usize,
    full_inverse: bool,
) -> Vec<WcsResult<Vec<[f64; 2]>>>
where
    S: WcsModel + Sync + ?Sized,
    T: WcsModel + Sync + ?Sized,
{
    (0..height)
        .into_par_iter()
        .map(|y| map_row(source, target, width, y, full_inverse))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn map_rows<S, T>(
    source: &S,
    target: &T,
    width: usize,
    height: usize,
    full_inverse: bool,
) -> Vec<WcsResult<Vec<[f64; 2]>>>
where
    S: WcsModel + Sync + ?Sized,
    T: WcsModel + Sync + ?Sized,
{
    (0..height)
        .map(|y| map_row(source, target, width, y, full_inverse))
        .collect()
}

fn map_row<S, T>(
    source: &S,
    target: &T,
    width: usize,
    y: usize,
    full_inverse: bool,
) -> WcsResult<Vec<[f64; 2]>>
where
    S: WcsModel + ?Sized,
    T: WcsModel + ?Sized,
{
    let pixels: Vec<(f64, f64)> = (0..width)
        .map(|x| PixelCoord::from_array_index(y, x))
        .map(|p| (p.x(), p.y()))
        .collect();

    let sky = source.pixels_to_world(&pixels)?;
    let mapped = if full_inverse {
        target.worlds_to_pixels(&sky)?
    } else {
        target.worlds_to_pixels_linear(&sky)?
    };

    Ok(mapped.into_iter().map(|(x, y)| [x - 1.0, y - 1.0]).collect())
}
