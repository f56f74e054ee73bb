//! Separable convolution over padded grids.
//!
//! Taps are applied as a correlation: output sample `x` accumulates
//! `k[i] * s[x + i - center]`. The horizontal pass writes one intermediate row
//! per padded row, the vertical pass consumes those rows, so each output
//! sample costs `O(len_h + len_v)` instead of `O(len_h * len_v)`.
//!
//! Rows are processed in parallel with rayon; every worker reads the shared
//! input and writes only its own output row.

use rayon::prelude::*;

use crate::grid::PaddedGrid;
use crate::kernel::Kernel;

/// Convolves the interior of `input` with `horizontal` along rows, then with
/// `vertical` along columns.
///
/// The result has the same padded geometry as `input`; its border is zero and
/// must be stripped with [`PaddedGrid::unpad`]. Accumulation is done in `f64`.
///
/// # Panics
///
/// If either kernel reaches further than the padding radius.
pub fn convolve_separable(
    input: &PaddedGrid,
    horizontal: &Kernel,
    vertical: &Kernel,
) -> PaddedGrid {
    let radius = input.radius() as usize;
    assert!(
        reach(horizontal) <= radius && reach(vertical) <= radius,
        "kernel reach exceeds padding radius {radius}"
    );

    let width = input.inner_width() as usize;
    let height = input.inner_height() as usize;
    let padded = input.as_grid();
    let pw = padded.width() as usize;
    let ph = padded.height() as usize;
    let src = padded.as_raw();

    // Horizontal pass: every padded row, interior columns only.
    let hc = horizontal.center();
    let hw = horizontal.weights();
    let mut rows = vec![0.0f64; ph * width];
    rows.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let line = &src[y * pw..(y + 1) * pw];
        for (x, out) in row.iter_mut().enumerate() {
            let base = x + radius - hc;
            *out = hw
                .iter()
                .zip(&line[base..base + hw.len()])
                .map(|(&k, &s)| k * s as f64)
                .sum();
        }
    });

    // Vertical pass: interior rows, reading the intermediate rows.
    let vc = vertical.center();
    let vw = vertical.weights();
    let mut out = PaddedGrid::zeroed_like(input);
    let dst: &mut [f32] = out.as_grid_mut();
    dst.par_chunks_mut(pw)
        .enumerate()
        .skip(radius)
        .take(height)
        .for_each(|(y, line)| {
            let top = y - vc;
            for x in 0..width {
                let acc: f64 = vw
                    .iter()
                    .enumerate()
                    .map(|(j, &k)| k * rows[(top + j) * width + x])
                    .sum();
                line[x + radius] = acc as f32;
            }
        });
    out
}

/// Convolves with a single kernel along both axes.
pub fn convolve_symmetric(input: &PaddedGrid, kernel: &Kernel) -> PaddedGrid {
    convolve_separable(input, kernel, kernel)
}

fn reach(kernel: &Kernel) -> usize {
    let c = kernel.center();
    c.max(kernel.len().saturating_sub(c + 1))
}
