//! # Staged Canny Edge Detection
//!
//! This crate implements the Canny edge detector as a sequence of inspectable
//! stages. Every intermediate result (smoothed image, raw and normalized
//! gradients, suppressed magnitude, threshold maps and the final hysteresis
//! map) stays queryable after a run, and the hysteresis stage tracks each pixel
//! with an explicit state instead of magic intensity values.
//!
//! ## Features
//!
//! - Separable Gaussian smoothing with a validated `floor(2*sigma)` kernel
//! - Separable Sobel gradients with global min-max normalization
//! - Non-maximum suppression along the quantized gradient direction
//! - Hysteresis with an iterative 8-connected flood fill
//! - Parallel per-row processing using rayon
//! - Optional debug logging (enable with `logger` feature)
//! - Optional `serde` support for [`CannyParams`] (enable with `serde` feature)
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use image::open;
//! use canny_stages::{CannyParams, CannyPipeline, Stage};
//!
//! // Decoding stays outside the pipeline
//! let image = open("example.png").unwrap().to_luma8();
//! let run = CannyPipeline::new(&image, CannyParams::new(1.5, 0.1, 0.3)).unwrap();
//!
//! run.artifact_luma8(Stage::HysteresisFinal)
//!     .save("edges_output.png")
//!     .unwrap();
//!
//! println!("Found {} edge pixels", run.edge_points().len());
//! ```
//!
//! ## Optional Features
//!
//! ### Logger Feature
//!
//! Enable debug logging to monitor the pipeline stages:
//!
//! ```toml
//! [dependencies]
//! canny-stages = { version = "0.1.0", features = ["logger"] }
//! log = "0.4"
//! env_logger = "0.11"
//! ```
//!
//! ```rust,no_run
//! use image::open;
//! use canny_stages::{CannyParams, CannyPipeline};
//!
//! // Initialize logger to see debug output
//! env_logger::init();
//!
//! let image = open("example.png").unwrap().to_luma8();
//! let run = CannyPipeline::new(&image, CannyParams::default()).unwrap();
//! // With logger feature, you'll see debug messages like:
//! // DEBUG canny_stages::pipeline: start canny pipeline 640x480, sigma 1.5
//! // DEBUG canny_stages::hysteresis: hysteresis trace ok, 812 seeds, 2301 linked
//! ```
//!
//! ## Advanced Usage
//!
//! ```rust,no_run
//! use image::open;
//! use canny_stages::{CandidatePolicy, CannyParams, CannyPipeline, Stage};
//!
//! let image = open("board.tif").unwrap().to_luma8();
//!
//! // Compare several blur levels, keeping linked weak edges visible in gray
//! let params = CannyParams::default()
//!     .with_thresholds(0.08, 0.25)
//!     .with_candidate_policy(CandidatePolicy::Mark);
//! let runs = CannyPipeline::sweep(&image, &[1.5, 2.5, 3.5], params).unwrap();
//!
//! for run in &runs {
//!     for (stage, _) in run.artifacts() {
//!         let name = format!("{}_{}.png", run.params().sigma, stage.file_stem());
//!         run.artifact_luma8(stage).save(name).unwrap();
//!     }
//! }
//! ```

// Conditional logging macros
#[cfg(feature = "logger")]
macro_rules! debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub mod convolve;
pub mod error;
pub mod field;
pub mod gradient;
pub mod grid;
pub mod hysteresis;
pub mod kernel;
pub mod params;
pub mod pipeline;
pub mod smoothing;
pub mod suppression;

pub use error::{CannyError, Result};
pub use field::{Direction, GradientCell, GradientExtrema, GradientField, HysteresisState, Span};
pub use grid::{grid_from_luma8, grid_from_raw, grid_to_luma8, Grid, PaddedGrid};
pub use kernel::{max_kernel_len, Kernel};
pub use params::{BorderMode, CandidatePolicy, CannyParams};
pub use pipeline::{CannyPipeline, Stage};
