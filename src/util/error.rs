//! Error types for cgmerge.

use thiserror::Error;

/// Result alias for cgmerge operations.
pub type CgResult<T> = std::result::Result<T, CgError>;

/// Errors raised by buffer construction, parameter validation and image I/O.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CgError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the requested view.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A configuration value is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParams(&'static str),
    /// A color string could not be parsed.
    #[error("unable to parse color {input:?}")]
    InvalidColor { input: String },
    /// Decoding or encoding an image failed.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
}
