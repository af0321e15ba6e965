//! SIMD clear kernel using the `wide` crate.
//!
//! Squared distances for eight pixels are computed per iteration with `i32x8`
//! lanes; the tail falls back to the scalar rule.

use crate::image::Rgba8;
use crate::kernel::{ClearKernel, ClearRule};
use wide::i32x8;

const LANES: usize = 8;

/// Splits eight pixels into per-channel lanes.
#[inline]
fn load_channels(chunk: &[Rgba8]) -> (i32x8, i32x8, i32x8) {
    let mut r = [0i32; LANES];
    let mut g = [0i32; LANES];
    let mut b = [0i32; LANES];
    for (i, px) in chunk.iter().take(LANES).enumerate() {
        r[i] = i32::from(px[0]);
        g[i] = i32::from(px[1]);
        b[i] = i32::from(px[2]);
    }
    (i32x8::from(r), i32x8::from(g), i32x8::from(b))
}

/// SIMD clear kernel.
pub struct ClearSimd;

impl ClearKernel for ClearSimd {
    fn clear(pixels: &mut [Rgba8], rule: ClearRule) -> usize {
        // Both rules reduce to `value < bound` on a squared magnitude.
        let (offset, bound) = match rule {
            ClearRule::Match {
                target,
                threshold_sq,
            } => (
                [
                    i32::from(target[0]),
                    i32::from(target[1]),
                    i32::from(target[2]),
                ],
                threshold_sq as i32 + 1,
            ),
            ClearRule::Norm { threshold_sq } => ([0, 0, 0], threshold_sq as i32),
        };
        let off_r = i32x8::splat(offset[0]);
        let off_g = i32x8::splat(offset[1]);
        let off_b = i32x8::splat(offset[2]);

        let mut cleared = 0usize;
        let mut chunks = pixels.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            let (r, g, b) = load_channels(chunk);
            let dr = r - off_r;
            let dg = g - off_g;
            let db = b - off_b;
            let dist = dr * dr + dg * dg + db * db;
            let dist = dist.to_array();
            for (px, d) in chunk.iter_mut().zip(dist) {
                if d < bound {
                    *px = [0, 0, 0, 0];
                    cleared += 1;
                }
            }
        }

        for px in chunks.into_remainder() {
            if rule.hits(*px) {
                *px = [0, 0, 0, 0];
                cleared += 1;
            }
        }
        cleared
    }
}
