//! Image views and owned pixel buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! Pixels are stored as fixed-size arrays (`Rgba8`, `Rgb8`), so one element is
//! one pixel and every stride and length below is counted in pixels.

use crate::util::{CgError, CgResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod resize;

/// One RGBA pixel, straight (non-premultiplied) alpha.
pub type Rgba8 = [u8; 4];

/// One RGB pixel.
pub type Rgb8 = [u8; 3];

/// Drops the alpha channel of an RGBA pixel.
#[inline]
pub fn rgb_of(px: Rgba8) -> Rgb8 {
    [px[0], px[1], px[2]]
}

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> CgResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> CgResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(CgError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in pixels between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the total number of pixels in the view.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Views are never empty; construction rejects zero dimensions.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Iterates over the rows of the view, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> CgResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(CgError::InvalidDimensions { width, height });
        }
        let end_x = x.checked_add(width);
        let end_y = y.checked_add(height);
        match (end_x, end_y) {
            (Some(ex), Some(ey)) if ex <= self.width && ey <= self.height => {}
            _ => return Err(CgError::InvalidParams("roi exceeds image bounds")),
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(CgError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self.data.get(start..).ok_or(CgError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;

        ImageView::new(data, width, height, self.stride)
    }
}

impl<'a, T: Copy> ImageView<'a, T> {
    /// Copies the view into a contiguous owned buffer.
    pub fn to_owned_image(&self) -> OwnedImage<T> {
        let mut data = Vec::with_capacity(self.len());
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        OwnedImage {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> CgResult<usize> {
    if width == 0 || height == 0 {
        return Err(CgError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(CgError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(CgError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// Owned contiguous image buffer (`stride == width`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> OwnedImage<T> {
    /// Wraps a row-major buffer whose length is exactly `width * height`.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> CgResult<Self> {
        if width == 0 || height == 0 {
            return Err(CgError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(CgError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(CgError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(CgError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixels in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the pixels mutably in row-major order.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the image and returns its pixel buffer.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Returns row `y` mutably.
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get_mut(start..start + self.width)
    }
}

impl<T: Copy> OwnedImage<T> {
    /// Creates an image filled with a single pixel value.
    pub fn filled(width: usize, height: usize, value: T) -> CgResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(CgError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }
}

impl OwnedImage<Rgba8> {
    /// Drops the alpha channel.
    pub fn to_rgb(&self) -> OwnedImage<Rgb8> {
        OwnedImage {
            data: self.data.iter().map(|&px| rgb_of(px)).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl OwnedImage<Rgb8> {
    /// Adds a fully opaque alpha channel.
    pub fn to_rgba(&self) -> OwnedImage<Rgba8> {
        OwnedImage {
            data: self
                .data
                .iter()
                .map(|&[r, g, b]| [r, g, b, 255])
                .collect(),
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageView, OwnedImage};
    use crate::util::CgError;

    #[test]
    fn owned_image_rejects_wrong_length() {
        let err = OwnedImage::new(vec![0u8; 5], 2, 2).unwrap_err();
        assert_eq!(err, CgError::InvalidDimensions { width: 2, height: 2 });
        let err = OwnedImage::new(vec![0u8; 3], 2, 2).unwrap_err();
        assert_eq!(err, CgError::BufferTooSmall { needed: 4, got: 3 });
    }

    #[test]
    fn to_owned_image_drops_row_padding() {
        let data: Vec<u8> = (0..12).collect();
        let view = ImageView::new(&data, 3, 3, 4).unwrap();
        let owned = view.to_owned_image();
        assert_eq!(owned.data(), &[0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }

    #[test]
    fn rgb_rgba_conversion_keeps_color() {
        let rgb = OwnedImage::filled(2, 1, [1u8, 2, 3]).unwrap();
        let rgba = rgb.to_rgba();
        assert_eq!(rgba.data(), &[[1, 2, 3, 255], [1, 2, 3, 255]]);
        assert_eq!(rgba.to_rgb(), rgb);
    }
}
