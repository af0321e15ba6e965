//! Alpha-over compositing of an aligned diff onto its base.
//!
//! Straight (non-premultiplied) alpha in `f32`, truncated back to 8 bits.

use crate::image::{ImageView, OwnedImage, Rgba8};
use crate::trace::trace_span;

/// Blends one diff pixel over one base pixel.
#[inline]
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let a = f32::from(src[3]) / 255.0;
    let inv = 1.0 - a;
    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = (a * f32::from(src[i]) + inv * f32::from(dst[i])) as u8;
    }
    let base_a = f32::from(dst[3]) / 255.0;
    out[3] = ((a + base_a * inv) * 255.0) as u8;
    out
}

/// Returns a copy of `base` with `diff` blended over it at `(dx, dy)`.
///
/// Offsets may be negative or push the diff past the canvas; only the overlap
/// is blended.
pub fn composite_over(
    base: &OwnedImage<Rgba8>,
    diff: ImageView<'_, Rgba8>,
    dx: i64,
    dy: i64,
) -> OwnedImage<Rgba8> {
    let mut out = base.clone();
    composite_in_place(&mut out, diff, dx, dy);
    out
}

/// Blends `diff` over `canvas` at `(dx, dy)` in place.
pub fn composite_in_place(
    canvas: &mut OwnedImage<Rgba8>,
    diff: ImageView<'_, Rgba8>,
    dx: i64,
    dy: i64,
) {
    let _span = trace_span!("composite", dx = dx, dy = dy).entered();

    let Some((xs, ys)) = overlap(
        (canvas.width(), canvas.height()),
        (diff.width(), diff.height()),
        dx,
        dy,
    ) else {
        return;
    };

    for y in ys.0..ys.1 {
        let src_y = (y as i64 - dy) as usize;
        let (Some(dst_row), Some(src_row)) = (canvas.row_mut(y), diff.row(src_y)) else {
            continue;
        };
        let src_x0 = (xs.0 as i64 - dx) as usize;
        let src = &src_row[src_x0..src_x0 + (xs.1 - xs.0)];
        for (d, &s) in dst_row[xs.0..xs.1].iter_mut().zip(src) {
            *d = over(*d, s);
        }
    }
}

/// Half-open canvas column and row spans covered by the diff, if any.
fn overlap(
    canvas: (usize, usize),
    diff: (usize, usize),
    dx: i64,
    dy: i64,
) -> Option<((usize, usize), (usize, usize))> {
    let span = |len: usize, size: usize, offset: i64| -> Option<(usize, usize)> {
        let lo = offset.max(0);
        let hi = offset.saturating_add(size as i64).min(len as i64);
        (hi > lo).then_some((lo as usize, hi as usize))
    };
    Some((span(canvas.0, diff.0, dx)?, span(canvas.1, diff.1, dy)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces() {
        assert_eq!(over([1, 2, 3, 0], [9, 8, 7, 255]), [9, 8, 7, 255]);
    }

    #[test]
    fn transparent_source_keeps_opaque_base() {
        assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 0]), [1, 2, 3, 255]);
    }

    #[test]
    fn half_alpha_truncates() {
        let out = over([0, 0, 0, 255], [255, 101, 0, 128]);
        // 128/255 * 255 lands just above or below 128 in f32; both truncate
        // into [127, 128].
        assert!((127..=128).contains(&out[0]));
        assert!((50..=51).contains(&out[1]));
        assert_eq!(out[2], 0);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn overlap_clips_all_sides() {
        assert_eq!(overlap((10, 10), (4, 4), 2, 3), Some(((2, 6), (3, 7))));
        assert_eq!(overlap((10, 10), (4, 4), -2, 8), Some(((0, 2), (8, 10))));
        assert_eq!(overlap((10, 10), (4, 4), 10, 0), None);
        assert_eq!(overlap((10, 10), (4, 4), -4, 0), None);
    }

    #[test]
    fn negative_offset_blends_visible_part() {
        let base = OwnedImage::filled(3, 3, [0u8, 0, 0, 255]).unwrap();
        let diff = OwnedImage::filled(2, 2, [200u8, 100, 50, 255]).unwrap();
        let out = composite_over(&base, diff.view(), -1, -1);
        assert_eq!(out.data()[0], [200, 100, 50, 255]);
        assert_eq!(out.data()[1], [0, 0, 0, 255]);
        assert_eq!(out.data()[3], [0, 0, 0, 255]);
        assert_eq!(base.data()[0], [0, 0, 0, 255]);
    }

    #[test]
    fn disjoint_diff_leaves_base_unchanged() {
        let base = OwnedImage::filled(3, 3, [5u8, 6, 7, 200]).unwrap();
        let diff = OwnedImage::filled(2, 2, [255u8, 255, 255, 255]).unwrap();
        assert_eq!(composite_over(&base, diff.view(), 50, -50), base);
    }
}
