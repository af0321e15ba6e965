//! Low-level building blocks for custom pair pipelines.
//!
//! These expose the pixel kernels, the clear rule and grid scan helpers for
//! callers that drive the stages themselves. Most users should prefer
//! [`crate::pipeline`] and [`crate::Aligner`].

pub use crate::background::clear_rule;
pub use crate::composite::{composite_in_place, over};
pub use crate::features::{compute_features, dominant_color_mask, Mask};
pub use crate::image::resize::{fit_within, resize_bilinear};
pub use crate::kernel::scalar::{border_distance, scan_grid, ClearScalar};
pub use crate::kernel::{ClearKernel, ClearRule, Grid, GridBest};
pub use crate::pairing::pick_parent;
pub use crate::util::math::MAX_PIXEL_DISTANCE;

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::{clear_par, scan_grid_par};
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ClearSimd;
