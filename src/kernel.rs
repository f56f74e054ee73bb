//! Normalized 1D Gaussian kernel.
//!
//! Conventions:
//! - `len = floor(2*sigma)`, deliberately narrower than a `6*sigma+1` window.
//! - tap `i` sits at offset `i - len/2`, so even lengths lean one tap left.
//! - weights are divided by their sum, `sum(w) ~= 1`.
//! - length never exceeds `u32::MAX`, and a pipeline caps it further with
//!   [`max_kernel_len`].

use crate::error::{CannyError, Result};

const MAX_LEN: usize = u32::MAX as usize;

/// Longest kernel worth applying to a `width` x `height` grid. Any further
/// tap only ever reads border samples.
pub fn max_kernel_len(width: u32, height: u32) -> usize {
    2 * width.max(height) as usize + 1
}

#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    weights: Vec<f64>,
}

impl Kernel {
    /// Builds the smoothing kernel for `sigma`.
    pub fn gaussian(sigma: f64) -> Result<Self> {
        Self::gaussian_within(sigma, MAX_LEN)
    }

    /// Builds the smoothing kernel for `sigma`, rejecting it before any
    /// allocation if it would hold more than `limit` taps.
    pub fn gaussian_within(sigma: f64, limit: usize) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(CannyError::InvalidSigma(sigma));
        }
        let span = (2.0 * sigma).floor();
        // Saturating cast; only used once `span` is known to be in range.
        let length = span as usize;
        if length < 1 {
            return Err(CannyError::KernelTooShort { sigma, length });
        }
        let limit = limit.min(MAX_LEN);
        if span > limit as f64 {
            return Err(CannyError::KernelTooLong { length, limit });
        }

        let center = (length / 2) as f64;
        let two_sigma2 = 2.0 * sigma * sigma;
        let norm = 1.0 / (2.0 * std::f64::consts::PI).sqrt() / sigma;
        let mut weights: Vec<f64> = (0..length)
            .map(|i| {
                let x = i as f64 - center;
                norm * (-(x * x) / two_sigma2).exp()
            })
            .collect();

        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }
        Ok(Self { weights })
    }

    /// Wraps arbitrary weights, e.g. the Sobel taps. Not normalized.
    pub(crate) fn from_weights(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Index of the tap aligned with the output sample.
    pub fn center(&self) -> usize {
        self.weights.len() / 2
    }

    /// Border needed so every tap of an interior sample stays in bounds.
    pub fn radius(&self) -> u32 {
        u32::try_from(self.center()).unwrap_or(u32::MAX)
    }
}
