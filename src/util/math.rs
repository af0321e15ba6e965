//! Pixel arithmetic shared by the feature, background and alignment stages.

/// Maximum squared RGB distance between two pixels (`255^2 * 3`).
pub const MAX_PIXEL_DISTANCE: u64 = 255 * 255 * 3;

/// Rec. 601 luma truncated to 8 bits.
#[inline]
pub(crate) fn luma_u8(rgb: [u8; 3]) -> u8 {
    luma_f64(rgb) as u8
}

/// Rec. 601 luma in floating point.
#[inline]
pub(crate) fn luma_f64(rgb: [u8; 3]) -> f64 {
    0.299 * f64::from(rgb[0]) + 0.587 * f64::from(rgb[1]) + 0.114 * f64::from(rgb[2])
}

/// Squared Euclidean distance between two RGB triples.
#[inline]
pub(crate) fn rgb_distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    let dr = i32::from(a[0]) - i32::from(b[0]);
    let dg = i32::from(a[1]) - i32::from(b[1]);
    let db = i32::from(a[2]) - i32::from(b[2]);
    (dr * dr + dg * dg + db * db) as u32
}

/// Squared length of an RGB vector.
#[inline]
pub(crate) fn rgb_norm_sq(rgb: [u8; 3]) -> u32 {
    rgb_distance_sq(rgb, [0, 0, 0])
}

/// Packs a quantized triple into one integer, red in the high bits.
#[inline]
pub(crate) fn pack_quantized(rgb: [u8; 3], bucket: u8) -> usize {
    let r = usize::from(rgb[0] / bucket);
    let g = usize::from(rgb[1] / bucket);
    let b = usize::from(rgb[2] / bucket);
    let levels = 256 / usize::from(bucket);
    (r * levels + g) * levels + b
}

#[cfg(test)]
mod tests {
    use super::{luma_u8, pack_quantized, rgb_distance_sq, rgb_norm_sq, MAX_PIXEL_DISTANCE};

    #[test]
    fn luma_truncates_toward_zero() {
        assert_eq!(luma_u8([255, 255, 255]), 255);
        assert_eq!(luma_u8([0, 0, 0]), 0);
        // 0.299 * 10 = 2.99
        assert_eq!(luma_u8([10, 0, 0]), 2);
    }

    #[test]
    fn distance_extremes() {
        assert_eq!(u64::from(rgb_distance_sq([0, 0, 0], [255, 255, 255])), MAX_PIXEL_DISTANCE);
        assert_eq!(rgb_distance_sq([7, 8, 9], [7, 8, 9]), 0);
        assert_eq!(rgb_norm_sq([1, 2, 2]), 9);
    }

    #[test]
    fn packing_orders_red_highest() {
        assert_eq!(pack_quantized([0, 0, 0], 16), 0);
        assert_eq!(pack_quantized([0, 0, 16], 16), 1);
        assert_eq!(pack_quantized([0, 16, 0], 16), 16);
        assert_eq!(pack_quantized([16, 0, 0], 16), 256);
        assert_eq!(pack_quantized([255, 255, 255], 32), 511);
    }
}
