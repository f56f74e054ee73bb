//! Error type shared by every pipeline stage.

/// Errors raised while validating parameters or input grids.
///
/// Every variant is a deterministic function of the caller's input; nothing
/// in the pipeline is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CannyError {
    /// Sigma is not a finite, strictly positive number.
    #[error("sigma must be finite and > 0, got {0}")]
    InvalidSigma(f64),

    /// `floor(2 * sigma)` produced an empty kernel.
    #[error("sigma {sigma} yields a kernel of length {length}; at least 1 tap is required")]
    KernelTooShort { sigma: f64, length: usize },

    /// A hysteresis threshold lies outside `[0, 1]` or is NaN.
    #[error("{name} threshold must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    /// The low threshold exceeds the high threshold.
    #[error("low threshold {low} exceeds high threshold {high}")]
    ThresholdOrder { low: f64, high: f64 },

    /// The kernel is longer than the grid it would smooth can use.
    #[error("kernel of length {length} exceeds the limit of {limit} taps")]
    KernelTooLong { length: usize, limit: usize },

    /// Padding a grid by `radius` overflows its `u32` extent.
    #[error("padding a {width}x{height} grid by {radius} overflows")]
    PaddingOverflow { width: u32, height: u32, radius: u32 },

    /// The input grid has a zero dimension.
    #[error("grid must be non-empty, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    /// A raw sample buffer does not match the declared dimensions.
    #[error("sample buffer holds {actual} values, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A stage identifier that names no pipeline artifact.
    #[error("unknown stage identifier `{0}`")]
    UnknownStage(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CannyError>;
