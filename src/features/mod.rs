//! Per-image statistics used to tell diff overlays from full artwork.
//!
//! A diff overlay is mostly one flat fill with a small painted region, so the
//! features measure how much of the image is near-black/near-white and how
//! large the biggest connected patch of the fill color is.

mod components;

pub use components::Mask;

use crate::image::resize::{fit_within, FEATURE_MAX_SIDE};
use crate::image::{ImageView, Rgb8};
use crate::trace::{trace_event, trace_span};
use crate::util::math::{luma_u8, pack_quantized};

/// Luma at or below this value counts as black.
pub const BLACK_LUMA_MAX: u8 = 8;
/// Luma at or above this value counts as white.
pub const WHITE_LUMA_MIN: u8 = 247;
/// Quantization levels per channel for the dominant color.
pub const DOMINANT_LEVELS: usize = 16;
/// Black or white coverage above which that color is taken as the fill.
pub const BW_FILL_RATIO: f64 = 0.25;
/// Stride applied to the fill mask before component labeling.
pub const FILL_MASK_STRIDE: usize = 2;

/// Statistical features of one image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageFeatures {
    /// Source width in pixels.
    pub width: usize,
    /// Source height in pixels.
    pub height: usize,
    /// Fraction of pixels that are neither black nor white.
    pub valid_ratio: f64,
    /// Largest connected fill region over the subsampled pixel count.
    pub max_fill_cc_ratio: f64,
    /// Largest coverage among black, white and the dominant color.
    pub fill_mode_ratio: f64,
}

/// Computes features for an RGB image, downsampling large inputs first.
///
/// `width`/`height` report the source dimensions; the ratios are measured on
/// the downsampled copy when the longer side exceeds `FEATURE_MAX_SIDE`.
pub fn extract_features(img: ImageView<'_, Rgb8>) -> ImageFeatures {
    let _span = trace_span!("extract_features", width = img.width(), height = img.height())
        .entered();

    let work = fit_within(img, FEATURE_MAX_SIDE);
    let mut features = compute_features(work.view());
    features.width = img.width();
    features.height = img.height();

    trace_event!(
        "features",
        valid_ratio = features.valid_ratio,
        max_fill_cc_ratio = features.max_fill_cc_ratio,
        fill_mode_ratio = features.fill_mode_ratio
    );
    features
}

/// Computes features on `img` as-is, without any resampling.
pub fn compute_features(img: ImageView<'_, Rgb8>) -> ImageFeatures {
    let width = img.width();
    let height = img.height();
    let total = img.len();

    let mut black = Vec::with_capacity(total);
    let mut white = Vec::with_capacity(total);
    for row in img.rows() {
        for &px in row {
            let luma = luma_u8(px);
            black.push(luma <= BLACK_LUMA_MAX);
            white.push(luma >= WHITE_LUMA_MIN);
        }
    }
    let valid_count = black
        .iter()
        .zip(white.iter())
        .filter(|&(&b, &w)| !(b || w))
        .count();

    let black = Mask::from_row_major(black, width, height);
    let white = Mask::from_row_major(white, width, height);
    let (dominant, dominant_ratio) = dominant_color_mask(img);

    let black_ratio = black.ratio();
    let white_ratio = white.ratio();
    let fill_mode_ratio = black_ratio.max(white_ratio).max(dominant_ratio);

    let fill = if black_ratio.max(white_ratio) >= BW_FILL_RATIO {
        if black_ratio >= white_ratio {
            black
        } else {
            white
        }
    } else {
        dominant
    };
    let max_fill_cc_ratio = fill.subsample(FILL_MASK_STRIDE).largest_component_ratio();
    let valid_ratio = valid_count as f64 / total as f64;

    ImageFeatures {
        width,
        height,
        valid_ratio,
        max_fill_cc_ratio,
        fill_mode_ratio,
    }
}

/// Mask of the most frequent color after quantizing to `DOMINANT_LEVELS`.
///
/// Ties go to the color with the smallest packed `(r, g, b)` value. Returns the
/// mask and its coverage ratio.
pub fn dominant_color_mask(img: ImageView<'_, Rgb8>) -> (Mask, f64) {
    let bucket = (256 / DOMINANT_LEVELS) as u8;
    let mut counts = vec![0usize; DOMINANT_LEVELS * DOMINANT_LEVELS * DOMINANT_LEVELS];
    let mut packed = Vec::with_capacity(img.len());
    for row in img.rows() {
        for &px in row {
            let key = pack_quantized(px, bucket);
            counts[key] += 1;
            packed.push(key);
        }
    }

    let (dominant, count) = modal_bucket(&counts);
    let bits = packed.into_iter().map(|key| key == dominant).collect();
    let mask = Mask::from_row_major(bits, img.width(), img.height());
    (mask, count as f64 / img.len() as f64)
}

/// Index and count of the first maximum in a histogram.
pub(crate) fn modal_bucket(counts: &[usize]) -> (usize, usize) {
    let mut best = (0usize, 0usize);
    for (idx, &count) in counts.iter().enumerate() {
        if count > best.1 {
            best = (idx, count);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{compute_features, dominant_color_mask, modal_bucket};
    use crate::image::OwnedImage;

    #[test]
    fn modal_bucket_prefers_first_maximum() {
        assert_eq!(modal_bucket(&[1, 3, 3, 0]), (1, 3));
        assert_eq!(modal_bucket(&[0, 0]), (0, 0));
    }

    #[test]
    fn dominant_color_groups_nearby_values() {
        let mut data = vec![[100u8, 100, 100]; 6];
        data.push([101, 102, 103]);
        data.push([10, 200, 30]);
        let img = OwnedImage::new(data, 4, 2).unwrap();
        let (mask, ratio) = dominant_color_mask(img.view());
        assert!((ratio - 7.0 / 8.0).abs() < 1e-12);
        assert!(!mask.bits()[7]);
    }

    #[test]
    fn black_canvas_with_small_patch() {
        let width = 40;
        let height = 40;
        let mut data = vec![[0u8, 0, 0]; width * height];
        for y in 10..20 {
            for x in 10..20 {
                data[y * width + x] = [200, 40, 40];
            }
        }
        let img = OwnedImage::new(data, width, height).unwrap();
        let features = compute_features(img.view());
        assert!((features.valid_ratio - 100.0 / 1600.0).abs() < 1e-12);
        assert!((features.fill_mode_ratio - 1500.0 / 1600.0).abs() < 1e-12);
        // Subsampled 20x20 grid with a 5x5 hole.
        assert!((features.max_fill_cc_ratio - 375.0 / 400.0).abs() < 1e-12);
    }

    #[test]
    fn colorful_image_has_no_dominant_fill() {
        let width = 16;
        let height = 16;
        let data = (0..width * height)
            .map(|i| [(i * 7 % 200 + 20) as u8, (i * 13 % 200 + 20) as u8, (i % 200 + 20) as u8])
            .collect();
        let img = OwnedImage::new(data, width, height).unwrap();
        let features = compute_features(img.view());
        assert_eq!(features.valid_ratio, 1.0);
        assert!(features.max_fill_cc_ratio < 0.35);
    }
}
