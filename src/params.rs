//! Pipeline configuration.
//!
//! [`CannyParams`] is the single validation boundary of the crate: sigma and
//! both hysteresis thresholds are checked here before any stage allocates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CannyError, Result};

/// How samples outside the grid are synthesized when a stage pads its input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BorderMode {
    /// Border samples are zero. Bright content touching the image border
    /// produces a spurious edge along it.
    Zero,
    /// Border samples copy the nearest in-bounds sample, so flat regions stay
    /// flat up to the border.
    #[default]
    Replicate,
}

/// Encoding of weak pixels that the connectivity trace linked to a strong
/// seed, in the `hysteresis-final` artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CandidatePolicy {
    /// Linked pixels are edges, rendered like strong seeds (255).
    #[default]
    Promote,
    /// Linked pixels are edges but rendered mid-gray (127) so seeds and
    /// linked pixels stay distinguishable in the final artifact.
    Mark,
}

/// Parameters of one pipeline run.
///
/// Thresholds apply to the min-max normalized gradient strength and so live
/// in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CannyParams {
    /// Gaussian standard deviation. The kernel holds `floor(2 * sigma)` taps.
    pub sigma: f64,
    /// Normalized strengths below this are background.
    pub low_threshold: f64,
    /// Normalized strengths above this seed the connectivity trace.
    pub high_threshold: f64,
    /// Padding used by smoothing and gradient convolution.
    pub border: BorderMode,
    /// Final encoding of linked weak pixels.
    pub candidate_policy: CandidatePolicy,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            sigma: 1.5,
            low_threshold: 0.1,
            high_threshold: 0.3,
            border: BorderMode::default(),
            candidate_policy: CandidatePolicy::default(),
        }
    }
}

impl CannyParams {
    pub fn new(sigma: f64, low_threshold: f64, high_threshold: f64) -> Self {
        Self {
            sigma,
            low_threshold,
            high_threshold,
            ..Self::default()
        }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.low_threshold = low;
        self.high_threshold = high;
        self
    }

    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    pub fn with_candidate_policy(mut self, policy: CandidatePolicy) -> Self {
        self.candidate_policy = policy;
        self
    }

    /// Checks sigma and thresholds.
    ///
    /// Kernel length is checked separately by [`crate::Kernel::gaussian`],
    /// which reports [`CannyError::KernelTooShort`].
    pub fn validate(&self) -> Result<()> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(CannyError::InvalidSigma(self.sigma));
        }
        check_unit("low", self.low_threshold)?;
        check_unit("high", self.high_threshold)?;
        if self.low_threshold > self.high_threshold {
            return Err(CannyError::ThresholdOrder {
                low: self.low_threshold,
                high: self.high_threshold,
            });
        }
        Ok(())
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CannyError::ThresholdOutOfRange { name, value })
    }
}
