//! Pixel kernels: background clearing, border distance and grid scans.
//!
//! Every kernel has a scalar reference implementation. The `simd` feature adds
//! a `wide`-based clear kernel and the `rayon` feature adds data-parallel
//! variants; all of them produce exactly the scalar result.

use crate::image::{Rgb8, Rgba8};
use crate::util::math::{rgb_distance_sq, rgb_norm_sq};

/// Which pixels a clear pass turns fully transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearRule {
    /// Squared RGB distance to `target` is at most `threshold_sq`.
    Match { target: Rgb8, threshold_sq: u32 },
    /// Squared RGB length is strictly below `threshold_sq`; no target color.
    Norm { threshold_sq: u32 },
}

impl ClearRule {
    /// Returns true if `px` should be cleared.
    #[inline]
    pub fn hits(&self, px: Rgba8) -> bool {
        let rgb = [px[0], px[1], px[2]];
        match *self {
            ClearRule::Match {
                target,
                threshold_sq,
            } => rgb_distance_sq(rgb, target) <= threshold_sq,
            ClearRule::Norm { threshold_sq } => rgb_norm_sq(rgb) < threshold_sq,
        }
    }
}

/// Kernel trait for in-place background clearing.
pub trait ClearKernel {
    /// Sets every pixel matched by `rule` to `[0, 0, 0, 0]` and returns how
    /// many pixels were cleared.
    fn clear(pixels: &mut [Rgba8], rule: ClearRule) -> usize;
}

/// Inclusive search window with per-axis steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub x_start: usize,
    pub x_end: usize,
    pub x_step: usize,
    pub y_start: usize,
    pub y_end: usize,
    pub y_step: usize,
}

impl Grid {
    /// Candidate x offsets in scan order.
    pub fn xs(&self) -> impl Iterator<Item = usize> {
        (self.x_start..=self.x_end).step_by(self.x_step.max(1))
    }

    /// Candidate y offsets in scan order.
    pub fn ys(&self) -> impl Iterator<Item = usize> {
        (self.y_start..=self.y_end).step_by(self.y_step.max(1))
    }
}

/// Best placement found so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBest {
    pub distance: u64,
    pub dx: usize,
    pub dy: usize,
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;
