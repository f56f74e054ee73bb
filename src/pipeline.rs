//! Pipeline orchestration and named stage artifacts.

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, Luma};
use imageproc::definitions::{HasBlack, HasWhite};
use rayon::prelude::*;

use crate::error::{CannyError, Result};
use crate::field::{GradientField, HysteresisState};
use crate::gradient::{
    compute_gradient_field, gx_grid, gx_normalized_grid, gy_grid, gy_normalized_grid,
    strength_grid, strength_normalized_grid,
};
use crate::grid::{grid_from_luma8, grid_to_luma8, Grid};
use crate::hysteresis::{hysteresis, HysteresisOutput};
use crate::kernel::{max_kernel_len, Kernel};
use crate::params::CannyParams;
use crate::smoothing::gaussian_smooth;
use crate::suppression::non_maximum_suppression;

/// Identifies one intermediate artifact of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Gaussian,
    GradientX,
    GradientY,
    GradientXNormalized,
    GradientYNormalized,
    Strength,
    StrengthNormalized,
    Suppressed,
    StrongThreshold,
    BetweenThreshold,
    HysteresisFinal,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Stage; 11] = [
        Stage::Gaussian,
        Stage::GradientX,
        Stage::GradientY,
        Stage::GradientXNormalized,
        Stage::GradientYNormalized,
        Stage::Strength,
        Stage::StrengthNormalized,
        Stage::Suppressed,
        Stage::StrongThreshold,
        Stage::BetweenThreshold,
        Stage::HysteresisFinal,
    ];

    /// Stable identifier, accepted back by [`Stage::from_str`].
    pub fn id(self) -> &'static str {
        match self {
            Stage::Gaussian => "gaussian",
            Stage::GradientX => "gradient-x",
            Stage::GradientY => "gradient-y",
            Stage::GradientXNormalized => "gradient-x-normalized",
            Stage::GradientYNormalized => "gradient-y-normalized",
            Stage::Strength => "strength",
            Stage::StrengthNormalized => "strength-normalized",
            Stage::Suppressed => "suppressed",
            Stage::StrongThreshold => "strong-threshold",
            Stage::BetweenThreshold => "between-threshold",
            Stage::HysteresisFinal => "hysteresis-final",
        }
    }

    /// Human-readable name for listings.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Gaussian => "Gaussian",
            Stage::GradientX => "Gradient X",
            Stage::GradientY => "Gradient Y",
            Stage::GradientXNormalized => "Gradient X Normalized",
            Stage::GradientYNormalized => "Gradient Y Normalized",
            Stage::Strength => "Gradient Strength",
            Stage::StrengthNormalized => "Gradient Strength Normalized",
            Stage::Suppressed => "Non-Maximum Suppression",
            Stage::StrongThreshold => "High Threshold",
            Stage::BetweenThreshold => "Between Thresholds",
            Stage::HysteresisFinal => "Hysteresis",
        }
    }

    /// File name stem for exporting the artifact. The viewable stages are
    /// numbered in display order; raw gradient stages are not.
    pub fn file_stem(self) -> &'static str {
        match self {
            Stage::Gaussian => "0_gaussian",
            Stage::GradientXNormalized => "1_gradient_x_norm",
            Stage::GradientYNormalized => "2_gradient_y_norm",
            Stage::StrengthNormalized => "3_gradient_strength_norm",
            Stage::Suppressed => "4_non_maximum_suppression",
            Stage::StrongThreshold => "5_high_threshold",
            Stage::BetweenThreshold => "6_between_thresholds",
            Stage::HysteresisFinal => "7_final_hysteresis",
            Stage::GradientX => "gradient_x",
            Stage::GradientY => "gradient_y",
            Stage::Strength => "gradient_strength",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Stage {
    type Err = CannyError;

    fn from_str(s: &str) -> Result<Self> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.id() == s)
            .ok_or_else(|| CannyError::UnknownStage(s.to_string()))
    }
}

/// One complete, eagerly evaluated run of the edge pipeline.
///
/// Construction is the only entry point: every stage has run by the time
/// [`CannyPipeline::new`] returns, and the artifacts are read-only afterwards.
/// Instances share no state, so independent runs may execute concurrently.
#[derive(Clone, Debug)]
pub struct CannyPipeline {
    params: CannyParams,
    kernel: Kernel,
    field: GradientField,
    artifacts: Vec<Grid>,
}

impl CannyPipeline {
    /// Validates `params` and `image`, then runs smoothing, gradient,
    /// suppression and hysteresis in order.
    ///
    /// The kernel may hold at most [`max_kernel_len`] taps for the image, so
    /// an oversized sigma fails with [`CannyError::KernelTooLong`] instead
    /// of allocating padding proportional to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canny_stages::{CannyParams, CannyPipeline, Stage};
    /// use image::{GrayImage, Luma};
    ///
    /// let image = GrayImage::from_fn(9, 9, |x, _| Luma([if x >= 4 { 255 } else { 0 }]));
    /// let run = CannyPipeline::new(&image, CannyParams::new(1.0, 0.1, 0.3)).unwrap();
    ///
    /// let edges = run.artifact(Stage::HysteresisFinal);
    /// assert_eq!(edges.get_pixel(4, 4)[0], 255.0);
    /// assert_eq!(run.edge_points().len(), 9);
    /// ```
    pub fn new(image: &GrayImage, params: CannyParams) -> Result<Self> {
        params.validate()?;
        let input = grid_from_luma8(image)?;
        let limit = max_kernel_len(input.width(), input.height());
        let kernel = Kernel::gaussian_within(params.sigma, limit)?;
        debug!(
            "start canny pipeline {}x{}, sigma {}",
            input.width(),
            input.height(),
            params.sigma
        );

        let gaussian = gaussian_smooth(&input, &kernel, params.border)?;
        let mut field = compute_gradient_field(&gaussian, params.border)?;

        let gradient_x = gx_grid(&field);
        let gradient_y = gy_grid(&field);
        let gradient_x_normalized = gx_normalized_grid(&field);
        let gradient_y_normalized = gy_normalized_grid(&field);
        let strength = strength_grid(&field);
        let strength_normalized = strength_normalized_grid(&field);

        let suppressed = non_maximum_suppression(&mut field);

        let HysteresisOutput {
            strong,
            between,
            combined,
        } = hysteresis(
            &mut field,
            params.low_threshold,
            params.high_threshold,
            params.candidate_policy,
        );

        debug!(
            "canny pipeline ok, {} edge pixels",
            field.count_state(HysteresisState::StrongEdge)
        );

        // Order matches `Stage::ALL`.
        let artifacts = vec![
            gaussian,
            gradient_x,
            gradient_y,
            gradient_x_normalized,
            gradient_y_normalized,
            strength,
            strength_normalized,
            suppressed,
            strong,
            between,
            combined,
        ];

        Ok(Self {
            params,
            kernel,
            field,
            artifacts,
        })
    }

    /// Runs one independent pipeline per sigma, in parallel.
    ///
    /// Results keep the order of `sigmas`. The first failing sigma aborts the
    /// sweep with its error.
    pub fn sweep(image: &GrayImage, sigmas: &[f64], params: CannyParams) -> Result<Vec<Self>> {
        sigmas
            .par_iter()
            .map(|&sigma| Self::new(image, params.with_sigma(sigma)))
            .collect()
    }

    pub fn params(&self) -> &CannyParams {
        &self.params
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// The gradient field after finalization. Every state is terminal.
    pub fn field(&self) -> &GradientField {
        &self.field
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.field.dimensions()
    }

    /// Final hysteresis state at `(x, y)`, if inside the image.
    pub fn state_at(&self, x: u32, y: u32) -> Option<HysteresisState> {
        let (w, h) = self.dimensions();
        (x < w && y < h).then(|| self.field.get(x, y).state)
    }

    pub fn artifact(&self, stage: Stage) -> &Grid {
        &self.artifacts[stage.slot()]
    }

    /// The artifact rounded and clamped to 8 bits, ready for an encoder.
    pub fn artifact_luma8(&self, stage: Stage) -> GrayImage {
        grid_to_luma8(self.artifact(stage))
    }

    /// All artifacts in pipeline order.
    pub fn artifacts(&self) -> impl Iterator<Item = (Stage, &Grid)> + '_ {
        Stage::ALL.into_iter().map(move |stage| (stage, self.artifact(stage)))
    }

    /// Binary edge image: white where the final state is `StrongEdge`.
    pub fn edge_map(&self) -> GrayImage {
        let (w, h) = self.dimensions();
        GrayImage::from_fn(w, h, |x, y| {
            if self.field.get(x, y).state == HysteresisState::StrongEdge {
                Luma::<u8>::white()
            } else {
                Luma::<u8>::black()
            }
        })
    }

    /// Coordinates `(x, y)` of every final edge pixel, in row-major order.
    pub fn edge_points(&self) -> Vec<(u32, u32)> {
        self.field
            .cells()
            .par_iter()
            .enumerate()
            .filter(|(_, c)| c.state == HysteresisState::StrongEdge)
            .map(|(i, _)| self.field.position(i))
            .collect()
    }
}
