//! Gradient stage: separable Sobel, magnitude, direction and normalization.
//!
//! Sobel operators, written as correlation taps over `(row, col)`:
//!
//! ```text
//! gx (down the rows)      gy (across the columns)
//! [-1 -2 -1]              [-1  0  1]
//! [ 0  0  0]              [-2  0  2]
//! [ 1  2  1]              [-1  0  1]
//! ```
//!
//! Each factors into a `[1 2 1]` smoothing tap and a `[-1 0 1]` derivative
//! tap, so both go through the same separable convolution as the Gaussian.
//!
//! The stage runs two passes over the field. The first computes per-pixel
//! values and reduces the global extrema of `gx`, `gy` and strength; the
//! second normalizes against those extrema and cannot start before the first
//! has finished.

use rayon::prelude::*;

use crate::convolve::convolve_separable;
use crate::error::Result;
use crate::field::{Direction, GradientExtrema, GradientField};
use crate::grid::{Grid, PaddedGrid};
use crate::kernel::Kernel;
use crate::params::BorderMode;

const SMOOTH_TAPS: [f64; 3] = [1.0, 2.0, 1.0];
const DERIVATIVE_TAPS: [f64; 3] = [-1.0, 0.0, 1.0];

/// Raw Sobel responses, unpadded.
pub struct SobelResponse {
    /// Derivative down the rows, responds to horizontal edges.
    pub gx: Grid,
    /// Derivative across the columns, responds to vertical edges.
    pub gy: Grid,
}

/// Convolves `image` with both Sobel operators over a 1-pixel border.
pub fn sobel_gradients(image: &Grid, border: BorderMode) -> Result<SobelResponse> {
    let smooth = Kernel::from_weights(SMOOTH_TAPS.to_vec());
    let derivative = Kernel::from_weights(DERIVATIVE_TAPS.to_vec());
    let padded = PaddedGrid::pad(image, 1, border)?;

    let gx = convolve_separable(&padded, &smooth, &derivative).unpad();
    let gy = convolve_separable(&padded, &derivative, &smooth).unpad();
    Ok(SobelResponse { gx, gy })
}

/// Builds the gradient field of a smoothed grid.
///
/// On return every cell carries `gx`, `gy`, `strength`, `direction` and
/// `normalized_strength`, and is `Unvisited`.
pub fn compute_gradient_field(smoothed: &Grid, border: BorderMode) -> Result<GradientField> {
    let (width, height) = smoothed.dimensions();
    let SobelResponse { gx, gy } = sobel_gradients(smoothed, border)?;

    let mut field = GradientField::new(width, height);
    let gx_raw = gx.as_raw();
    let gy_raw = gy.as_raw();

    // Pass 1: per-pixel values and the coupled global reduction.
    let extrema = field
        .cells_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .map(|(y, row)| {
            let mut ext = GradientExtrema::default();
            let base = y * width as usize;
            for (x, cell) in row.iter_mut().enumerate() {
                let gxv = gx_raw[base + x];
                let gyv = gy_raw[base + x];
                let strength = (gxv as f64).hypot(gyv as f64) as f32;
                cell.gx = gxv;
                cell.gy = gyv;
                cell.strength = strength;
                cell.direction = Direction::from_gradient(gxv as f64, gyv as f64);
                ext.gx.include(gxv);
                ext.gy.include(gyv);
                ext.strength.include(strength);
            }
            ext
        })
        .reduce(GradientExtrema::default, GradientExtrema::merge);

    // Pass 2: normalization against the finished extrema.
    let span = extrema.strength;
    field
        .cells_mut()
        .par_iter_mut()
        .for_each(|cell| cell.normalized_strength = span.normalize(cell.strength));
    field.set_extrema(extrema);

    debug!(
        "gradient field ok, strength range [{}, {}]",
        extrema.strength.min, extrema.strength.max
    );
    Ok(field)
}

/// Raw `gx` values.
pub fn gx_grid(field: &GradientField) -> Grid {
    field.render(|c| c.gx)
}

/// Raw `gy` values.
pub fn gy_grid(field: &GradientField) -> Grid {
    field.render(|c| c.gy)
}

/// `gx` scaled into `[0, 255]` for viewing.
pub fn gx_normalized_grid(field: &GradientField) -> Grid {
    let span = field.extrema().gx;
    field.render(move |c| span.normalize(c.gx) * 255.0)
}

/// `gy` scaled into `[0, 255]` for viewing.
pub fn gy_normalized_grid(field: &GradientField) -> Grid {
    let span = field.extrema().gy;
    field.render(move |c| span.normalize(c.gy) * 255.0)
}

pub fn strength_grid(field: &GradientField) -> Grid {
    field.render(|c| c.strength)
}

/// Normalized strength scaled into `[0, 255]` for viewing.
pub fn strength_normalized_grid(field: &GradientField) -> Grid {
    field.render(|c| c.normalized_strength * 255.0)
}
