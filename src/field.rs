//! Per-pixel gradient and hysteresis record shared by the later stages.
//!
//! A [`GradientField`] is allocated once per pipeline run by the gradient
//! stage, then mutated in place by suppression and hysteresis. Coordinates
//! follow the `image` crate: `x` is the column, `y` the row.

use image::ImageBuffer;
use rayon::prelude::*;

use crate::grid::Grid;

/// Gradient orientation quantized to four bins, in degrees within `[0, 180)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `[0, 22.5) ∪ [157.5, 180]`
    #[default]
    Deg0,
    /// `[22.5, 67.5)`
    Deg45,
    /// `[67.5, 112.5)`
    Deg90,
    /// `[112.5, 157.5)`
    Deg135,
}

impl Direction {
    /// Quantizes an angle already folded into `[0, 180]`.
    pub fn from_degrees(angle: f64) -> Self {
        if (22.5..67.5).contains(&angle) {
            Self::Deg45
        } else if (67.5..112.5).contains(&angle) {
            Self::Deg90
        } else if (112.5..157.5).contains(&angle) {
            Self::Deg135
        } else {
            Self::Deg0
        }
    }

    /// Quantizes the direction of `(gx, gy)`, where `gx` is the derivative
    /// down the rows and `gy` the derivative across the columns.
    pub fn from_gradient(gx: f64, gy: f64) -> Self {
        let mut angle = gy.atan2(gx).to_degrees();
        if angle < 0.0 {
            angle += 180.0;
        }
        Self::from_degrees(angle)
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg45 => 45,
            Self::Deg90 => 90,
            Self::Deg135 => 135,
        }
    }

    /// `(dx, dy)` offsets of the two neighbours lying along the gradient.
    ///
    /// In `(row, col)` terms: 0° compares `(r-1,c),(r+1,c)`, 45° compares
    /// `(r-1,c-1),(r+1,c+1)`, 90° compares `(r,c-1),(r,c+1)` and 135°
    /// compares `(r-1,c+1),(r+1,c-1)`.
    pub fn neighbor_offsets(self) -> [(i64, i64); 2] {
        match self {
            Self::Deg0 => [(0, -1), (0, 1)],
            Self::Deg45 => [(-1, -1), (1, 1)],
            Self::Deg90 => [(-1, 0), (1, 0)],
            Self::Deg135 => [(1, -1), (-1, 1)],
        }
    }
}

/// Visitation state of a pixel during hysteresis.
///
/// Transitions only leave `Unvisited`. `Candidate` exists only while the
/// connectivity trace runs and is folded away by finalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HysteresisState {
    #[default]
    Unvisited,
    Background,
    Candidate,
    StrongEdge,
}

impl HysteresisState {
    /// Moves to `next`, checking the transition in debug builds.
    #[inline]
    pub(crate) fn advance(&mut self, next: HysteresisState) {
        debug_assert!(
            matches!(
                (*self, next),
                (HysteresisState::Unvisited, HysteresisState::Background)
                    | (HysteresisState::Unvisited, HysteresisState::Candidate)
                    | (HysteresisState::Unvisited, HysteresisState::StrongEdge)
                    | (HysteresisState::Candidate, HysteresisState::StrongEdge)
                    | (HysteresisState::Candidate, HysteresisState::Background)
            ),
            "illegal hysteresis transition {:?} -> {:?}",
            self,
            next
        );
        *self = next;
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Background | Self::StrongEdge)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradientCell {
    pub gx: f32,
    pub gy: f32,
    pub strength: f32,
    /// `strength` min-max normalized over the whole field, in `[0, 1]`.
    pub normalized_strength: f32,
    pub direction: Direction,
    pub state: HysteresisState,
}

/// Running minimum and maximum of one quantity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const EMPTY: Span = Span {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    #[inline]
    pub fn include(&mut self, v: f32) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Maps `v` into `[0, 1]`; a degenerate span maps everything to 0.
    #[inline]
    pub fn normalize(&self, v: f32) -> f32 {
        let range = self.max - self.min;
        if range > 0.0 {
            ((v - self.min) / range).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Global extrema gathered by the first gradient pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradientExtrema {
    pub gx: Span,
    pub gy: Span,
    pub strength: Span,
}

impl GradientExtrema {
    pub fn merge(self, other: GradientExtrema) -> GradientExtrema {
        GradientExtrema {
            gx: self.gx.merge(other.gx),
            gy: self.gy.merge(other.gy),
            strength: self.strength.merge(other.strength),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GradientField {
    width: u32,
    height: u32,
    cells: Vec<GradientCell>,
    extrema: GradientExtrema,
}

impl GradientField {
    /// Zeroed field with every pixel `Unvisited`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![GradientCell::default(); width as usize * height as usize],
            extrema: GradientExtrema::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Position of linear index `i`.
    #[inline]
    pub fn position(&self, i: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((i % w) as u32, (i / w) as u32)
    }

    /// Index of `(x + dx, y + dy)` if it lies inside the field.
    #[inline]
    pub fn offset(&self, x: u32, y: u32, dx: i64, dy: i64) -> Option<usize> {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some(self.index(nx as u32, ny as u32))
    }

    pub fn get(&self, x: u32, y: u32) -> &GradientCell {
        &self.cells[self.index(x, y)]
    }

    pub fn cells(&self) -> &[GradientCell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [GradientCell] {
        &mut self.cells
    }

    pub fn extrema(&self) -> &GradientExtrema {
        &self.extrema
    }

    pub(crate) fn set_extrema(&mut self, extrema: GradientExtrema) {
        self.extrema = extrema;
    }

    pub fn count_state(&self, state: HysteresisState) -> usize {
        self.cells.par_iter().filter(|c| c.state == state).count()
    }

    /// Renders one value per cell into a grid.
    pub fn render<F>(&self, f: F) -> Grid
    where
        F: Fn(&GradientCell) -> f32 + Sync + Send,
    {
        let raw: Vec<f32> = self.cells.par_iter().map(f).collect();
        ImageBuffer::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height))
    }
}
