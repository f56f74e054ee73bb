//! Scalar sample grids and their padded form.
//!
//! A [`Grid`] is an `f32` luminance buffer in the same `image` representation
//! the rest of the crate uses. Samples are logically 8-bit intensities but are
//! carried as floating point between stages. [`PaddedGrid`] adds the transient
//! border a convolution needs and is always shrunk back with
//! [`PaddedGrid::unpad`].

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Clamp;

use crate::error::{CannyError, Result};
use crate::params::BorderMode;

/// Single-channel `f32` sample grid.
pub type Grid = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Converts a decoded 8-bit image into a [`Grid`].
pub fn grid_from_luma8(image: &GrayImage) -> Result<Grid> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;
    let samples = image.as_raw().iter().map(|&p| p as f32).collect();
    grid_from_raw(width, height, samples)
}

/// Wraps a row-major sample buffer, checking it against the dimensions.
pub fn grid_from_raw(width: u32, height: u32, samples: Vec<f32>) -> Result<Grid> {
    ensure_non_empty(width, height)?;
    let expected = width as usize * height as usize;
    let actual = samples.len();
    ImageBuffer::from_raw(width, height, samples)
        .ok_or(CannyError::DimensionMismatch { expected, actual })
}

/// Renders a grid as 8-bit, rounding and clamping each sample to `[0, 255]`.
pub fn grid_to_luma8(grid: &Grid) -> GrayImage {
    let raw = grid.as_raw().iter().map(|&v| to_intensity(v)).collect();
    // Same dimensions and one channel, so the length always matches.
    GrayImage::from_raw(grid.width(), grid.height(), raw)
        .unwrap_or_else(|| GrayImage::new(grid.width(), grid.height()))
}

/// Rounds to the nearest intensity and clamps to `[0, 255]`.
#[inline]
pub fn clamp_intensity(value: f64) -> f32 {
    to_intensity(value as f32) as f32
}

#[inline]
fn to_intensity(value: f32) -> u8 {
    <u8 as Clamp<f32>>::clamp(value.round())
}

fn padded_extent(width: u32, height: u32, radius: u32) -> Result<(u32, u32)> {
    radius
        .checked_mul(2)
        .and_then(|grow| Some((width.checked_add(grow)?, height.checked_add(grow)?)))
        .ok_or(CannyError::PaddingOverflow {
            width,
            height,
            radius,
        })
}

fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CannyError::EmptyGrid { width, height });
    }
    Ok(())
}

/// A grid enlarged by `radius` samples on every side.
#[derive(Clone, Debug)]
pub struct PaddedGrid {
    grid: Grid,
    radius: u32,
}

impl PaddedGrid {
    /// Pads `source`, filling the border according to `border`.
    ///
    /// Fails with [`CannyError::PaddingOverflow`] if the padded extent does
    /// not fit in `u32`.
    pub fn pad(source: &Grid, radius: u32, border: BorderMode) -> Result<Self> {
        let (width, height) = source.dimensions();
        let (padded_width, padded_height) = padded_extent(width, height, radius)?;
        let r = radius as i64;
        let grid = ImageBuffer::from_fn(padded_width, padded_height, |x, y| {
            let sx = x as i64 - r;
            let sy = y as i64 - r;
            let inside = (0..width as i64).contains(&sx) && (0..height as i64).contains(&sy);
            match (inside, border) {
                (true, _) => *source.get_pixel(sx as u32, sy as u32),
                (false, BorderMode::Zero) => Luma([0.0]),
                (false, BorderMode::Replicate) => {
                    let cx = sx.clamp(0, width as i64 - 1) as u32;
                    let cy = sy.clamp(0, height as i64 - 1) as u32;
                    *source.get_pixel(cx, cy)
                }
            }
        });
        Ok(Self { grid, radius })
    }

    /// Zero-filled grid with the same padded geometry as `other`.
    pub(crate) fn zeroed_like(other: &PaddedGrid) -> Self {
        let (width, height) = other.grid.dimensions();
        Self {
            grid: ImageBuffer::new(width, height),
            radius: other.radius,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Width of the original, unpadded extent.
    pub fn inner_width(&self) -> u32 {
        self.grid.width() - 2 * self.radius
    }

    /// Height of the original, unpadded extent.
    pub fn inner_height(&self) -> u32 {
        self.grid.height() - 2 * self.radius
    }

    pub fn as_grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn as_grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Strips the border, returning a grid with the original extent.
    pub fn unpad(self) -> Grid {
        if self.radius == 0 {
            return self.grid;
        }
        let r = self.radius;
        ImageBuffer::from_fn(self.inner_width(), self.inner_height(), |x, y| {
            *self.grid.get_pixel(x + r, y + r)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32) -> Grid {
        ImageBuffer::from_fn(width, height, |x, y| Luma([(y * width + x) as f32]))
    }

    #[test]
    fn rejects_empty_and_mismatched_input() {
        assert_eq!(
            grid_from_luma8(&GrayImage::new(0, 4)),
            Err(CannyError::EmptyGrid {
                width: 0,
                height: 4
            })
        );
        assert_eq!(
            grid_from_raw(3, 3, vec![0.0; 8]),
            Err(CannyError::DimensionMismatch {
                expected: 9,
                actual: 8
            })
        );
    }

    #[test]
    fn zero_padding_surrounds_the_source() {
        let source = ramp(3, 2);
        let padded = PaddedGrid::pad(&source, 2, BorderMode::Zero).unwrap();
        assert_eq!(padded.as_grid().dimensions(), (7, 6));
        assert_eq!((padded.inner_width(), padded.inner_height()), (3, 2));
        assert_eq!(padded.as_grid().get_pixel(0, 0)[0], 0.0);
        assert_eq!(padded.as_grid().get_pixel(6, 5)[0], 0.0);
        assert_eq!(padded.as_grid().get_pixel(2, 2)[0], 0.0);
        assert_eq!(padded.as_grid().get_pixel(4, 3)[0], 5.0);
    }

    #[test]
    fn replicate_padding_copies_nearest_sample() {
        let source = ramp(3, 2);
        let padded = PaddedGrid::pad(&source, 1, BorderMode::Replicate).unwrap();
        let g = padded.as_grid();
        assert_eq!(g.get_pixel(0, 0)[0], 0.0);
        assert_eq!(g.get_pixel(4, 0)[0], 2.0);
        assert_eq!(g.get_pixel(0, 3)[0], 3.0);
        assert_eq!(g.get_pixel(4, 3)[0], 5.0);
    }

    #[test]
    fn unpad_restores_the_original() {
        let source = ramp(4, 3);
        for border in [BorderMode::Zero, BorderMode::Replicate] {
            let restored = PaddedGrid::pad(&source, 3, border).unwrap().unpad();
            assert_eq!(restored, source);
        }
    }

    #[test]
    fn oversized_padding_is_an_error() {
        let source = ramp(2, 2);
        assert_eq!(
            PaddedGrid::pad(&source, u32::MAX, BorderMode::Replicate).err(),
            Some(CannyError::PaddingOverflow {
                width: 2,
                height: 2,
                radius: u32::MAX
            })
        );
        assert!(PaddedGrid::pad(&source, u32::MAX / 2, BorderMode::Zero).is_err());
    }

    #[test]
    fn rendering_rounds_and_clamps() {
        let grid = grid_from_raw(4, 1, vec![-20.0, 127.6, 300.0, 64.2]).unwrap();
        assert_eq!(grid_to_luma8(&grid).as_raw(), &vec![0u8, 128, 255, 64]);
        assert_eq!(clamp_intensity(127.999_999_9), 128.0);
        assert_eq!(clamp_intensity(-3.0), 0.0);
    }
}
