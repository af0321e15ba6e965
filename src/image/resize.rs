//! Area-aware bilinear resampling for RGB images.

use crate::image::{ImageView, OwnedImage, Rgb8};

/// Longest side kept by feature extraction before downsampling kicks in.
pub const FEATURE_MAX_SIDE: usize = 1200;

/// Shrinks `src` so that its longer side equals `max_side`.
///
/// Images that already fit are copied unchanged. Target dimensions are
/// truncated (`floor(dim * scale)`) and never drop below one pixel.
pub fn fit_within(src: ImageView<'_, Rgb8>, max_side: usize) -> OwnedImage<Rgb8> {
    let width = src.width();
    let height = src.height();
    let longest = width.max(height);
    if longest <= max_side || max_side == 0 {
        return src.to_owned_image();
    }
    let scale = max_side as f64 / longest as f64;
    let dst_width = ((width as f64 * scale) as usize).max(1);
    let dst_height = ((height as f64 * scale) as usize).max(1);
    resize_bilinear(src, dst_width, dst_height)
}

/// Source window and normalized weights for one destination index.
struct Taps {
    start: usize,
    weights: Vec<f32>,
}

/// Triangle-filter taps along one axis.
///
/// When shrinking, the filter support widens by the scale factor so every
/// source pixel contributes to some destination pixel.
fn triangle_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let filter_scale = scale.max(1.0);
    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale;
            let start = (center - filter_scale + 0.5).floor().max(0.0) as usize;
            let end = ((center + filter_scale + 0.5).floor() as usize)
                .min(src_len)
                .max(start + 1);
            let mut weights: Vec<f32> = (start..end)
                .map(|j| {
                    let t = ((j as f32 - center + 0.5) / filter_scale).abs();
                    (1.0 - t).max(0.0)
                })
                .collect();
            let total: f32 = weights.iter().sum();
            if total > 0.0 {
                weights.iter_mut().for_each(|w| *w /= total);
            }
            Taps { start, weights }
        })
        .collect()
}

/// Resamples `src` to `dst_width x dst_height` with a separable bilinear
/// (triangle) filter.
///
/// Destination pixel `x` is centered on source coordinate
/// `(x + 0.5) * src_w / dst_w`. Upscaling interpolates between the two
/// nearest source pixels; downscaling stretches the triangle over the whole
/// scale factor and averages every covered pixel. Each channel is rounded to
/// the nearest integer.
pub fn resize_bilinear(
    src: ImageView<'_, Rgb8>,
    dst_width: usize,
    dst_height: usize,
) -> OwnedImage<Rgb8> {
    let width = src.width();
    let height = src.height();
    let dst_width = dst_width.max(1);
    let dst_height = dst_height.max(1);
    let x_taps = triangle_taps(width, dst_width);
    let y_taps = triangle_taps(height, dst_height);

    let mut out = Vec::with_capacity(dst_width * dst_height);
    let mut column_mix = vec![[0f32; 3]; width];
    for taps in &y_taps {
        column_mix.iter_mut().for_each(|acc| *acc = [0.0; 3]);
        for (offset, &w) in taps.weights.iter().enumerate() {
            let Some(row) = src.row(taps.start + offset) else {
                continue;
            };
            for (acc, px) in column_mix.iter_mut().zip(row) {
                for c in 0..3 {
                    acc[c] += px[c] as f32 * w;
                }
            }
        }

        for taps in &x_taps {
            let mut sum = [0f32; 3];
            for (offset, &w) in taps.weights.iter().enumerate() {
                let Some(acc) = column_mix.get(taps.start + offset) else {
                    continue;
                };
                for c in 0..3 {
                    sum[c] += acc[c] * w;
                }
            }
            out.push(sum.map(|v| v.round().clamp(0.0, 255.0) as u8));
        }
    }

    OwnedImage {
        data: out,
        width: dst_width,
        height: dst_height,
    }
}
