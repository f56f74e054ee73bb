//! Gaussian smoothing stage.

use rayon::prelude::*;

use crate::convolve::convolve_symmetric;
use crate::error::{CannyError, Result};
use crate::grid::{clamp_intensity, Grid, PaddedGrid};
use crate::kernel::{max_kernel_len, Kernel};
use crate::params::BorderMode;

/// Blurs `grid` with `kernel` along both axes.
///
/// The grid is padded by `kernel.radius()`, convolved, and unpadded, so the
/// output has the input's dimensions. Every output sample is rounded and
/// clamped to the 8-bit intensity range.
///
/// A kernel longer than [`max_kernel_len`] allows for this grid is rejected
/// with [`CannyError::KernelTooLong`].
pub fn gaussian_smooth(grid: &Grid, kernel: &Kernel, border: BorderMode) -> Result<Grid> {
    let limit = max_kernel_len(grid.width(), grid.height());
    if kernel.len() > limit {
        return Err(CannyError::KernelTooLong {
            length: kernel.len(),
            limit,
        });
    }
    let padded = PaddedGrid::pad(grid, kernel.radius(), border)?;
    let mut smoothed = convolve_symmetric(&padded, kernel).unpad();
    smoothed
        .par_iter_mut()
        .for_each(|v| *v = clamp_intensity(*v as f64));
    debug!("gaussian smoothing ok, kernel len {}", kernel.len());
    Ok(smoothed)
}
