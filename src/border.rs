//! Silhouette extraction for diff images.
//!
//! After background removal only the outline of the painted region is a
//! reliable anchor against the base, so alignment scores border pixels only.

use crate::image::{rgb_of, ImageView, Rgb8, Rgba8};

/// Border pixel coordinates with their colors, in row-major scan order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BorderSet {
    coords: Vec<(usize, usize)>,
    colors: Vec<Rgb8>,
}

impl BorderSet {
    /// `(row, col)` of each border pixel.
    pub fn coords(&self) -> &[(usize, usize)] {
        &self.coords
    }

    /// RGB of each border pixel, parallel to `coords`.
    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    /// Number of border pixels.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// True when the image had no opaque pixels.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Collects opaque pixels that touch transparency or the image edge.
///
/// A pixel qualifies when `alpha > 0` and either one of its 4-neighbours has
/// `alpha == 0` or it lies on the outermost row or column.
pub fn extract_border(img: ImageView<'_, Rgba8>) -> BorderSet {
    let width = img.width();
    let height = img.height();
    let transparent = |x: usize, y: usize| img.get(x, y).is_some_and(|px| px[3] == 0);

    let mut border = BorderSet::default();
    for y in 0..height {
        let Some(row) = img.row(y) else {
            break;
        };
        for (x, &px) in row.iter().enumerate() {
            if px[3] == 0 {
                continue;
            }
            let on_edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
            let is_border = on_edge
                || transparent(x - 1, y)
                || transparent(x + 1, y)
                || transparent(x, y - 1)
                || transparent(x, y + 1);
            if is_border {
                border.coords.push((y, x));
                border.colors.push(rgb_of(px));
            }
        }
    }
    border
}
