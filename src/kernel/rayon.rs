//! Rayon-parallel kernels (feature-gated).
//!
//! Clearing splits the pixel buffer into chunks; grid scans evaluate one
//! column per task. Both return exactly the sequential result.

use crate::border::BorderSet;
use crate::image::{ImageView, Rgba8};
use crate::kernel::scalar::scan_column;
use crate::kernel::{ClearKernel, ClearRule, Grid, GridBest};
use rayon::prelude::*;

// Per-chunk clear kernel: SIMD when available.
#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::ClearScalar as ChunkClear;
#[cfg(feature = "simd")]
use crate::kernel::simd::ClearSimd as ChunkClear;

const CLEAR_CHUNK: usize = 16 * 1024;

/// Chunk-parallel clear using the scalar kernel per chunk.
pub fn clear_par(pixels: &mut [Rgba8], rule: ClearRule) -> usize {
    pixels
        .par_chunks_mut(CLEAR_CHUNK)
        .map(|chunk| ChunkClear::clear(chunk, rule))
        .sum()
}

/// Column-parallel grid scan.
///
/// Each column starts from the incoming best distance and keeps its own first
/// minimum; columns are then merged in x order keeping strict improvements,
/// which reproduces the x-major sequential tie-break.
pub fn scan_grid_par(
    base: ImageView<'_, Rgba8>,
    border: &BorderSet,
    grid: Grid,
    best: GridBest,
) -> GridBest {
    let xs: Vec<usize> = grid.xs().collect();
    let columns: Vec<GridBest> = xs
        .par_iter()
        .map(|&dx| scan_column(base, border, &grid, dx, best))
        .collect();

    columns.into_iter().fold(best, |acc, col| {
        if col.distance < acc.distance {
            col
        } else {
            acc
        }
    })
}
