//! Scalar reference kernels.

use crate::border::BorderSet;
use crate::image::{rgb_of, ImageView, Rgba8};
use crate::kernel::{ClearKernel, ClearRule, Grid, GridBest};
use crate::util::math::{rgb_distance_sq, MAX_PIXEL_DISTANCE};

/// Scalar clear kernel.
pub struct ClearScalar;

impl ClearKernel for ClearScalar {
    fn clear(pixels: &mut [Rgba8], rule: ClearRule) -> usize {
        let mut cleared = 0usize;
        for px in pixels.iter_mut() {
            if rule.hits(*px) {
                *px = [0, 0, 0, 0];
                cleared += 1;
            }
        }
        cleared
    }
}

/// Sum of squared color distances between border pixels and the base at
/// offset `(dx, dy)`.
///
/// Border points landing outside the base add `MAX_PIXEL_DISTANCE`.
/// Accumulation stops as soon as the sum reaches `limit`; the returned value is
/// then some partial sum `>= limit`, which callers treat as "not better".
pub fn border_distance(
    base: ImageView<'_, Rgba8>,
    border: &BorderSet,
    dx: isize,
    dy: isize,
    limit: u64,
) -> u64 {
    let mut dis = 0u64;
    for (&(row, col), &color) in border.coords().iter().zip(border.colors()) {
        let y = row as isize + dy;
        let x = col as isize + dx;
        let term = if x < 0 || y < 0 {
            MAX_PIXEL_DISTANCE
        } else {
            match base.get(x as usize, y as usize) {
                Some(&px) => u64::from(rgb_distance_sq(rgb_of(px), color)),
                None => MAX_PIXEL_DISTANCE,
            }
        };
        dis += term;
        if dis >= limit {
            return dis;
        }
    }
    dis
}

/// Evaluates every grid placement, x-major, keeping strict improvements.
///
/// Ties keep the earlier candidate, including the incoming `best`.
pub fn scan_grid(
    base: ImageView<'_, Rgba8>,
    border: &BorderSet,
    grid: Grid,
    mut best: GridBest,
) -> GridBest {
    for dx in grid.xs() {
        best = scan_column(base, border, &grid, dx, best);
    }
    best
}

/// Evaluates one column of the grid at fixed `dx`.
pub(crate) fn scan_column(
    base: ImageView<'_, Rgba8>,
    border: &BorderSet,
    grid: &Grid,
    dx: usize,
    mut best: GridBest,
) -> GridBest {
    for dy in grid.ys() {
        let dis = border_distance(base, border, dx as isize, dy as isize, best.distance);
        if dis < best.distance {
            best = GridBest {
                distance: dis,
                dx,
                dy,
            };
        }
    }
    best
}
