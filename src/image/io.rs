//! Loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{OwnedImage, Rgb8, Rgba8};
use crate::util::{CgError, CgResult};
use std::fs;
use std::path::Path;

/// Creates an owned RGBA image from an `image` buffer.
pub fn owned_from_rgba_image(img: &image::RgbaImage) -> CgResult<OwnedImage<Rgba8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img
        .as_raw()
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    OwnedImage::new(data, width, height)
}

/// Creates an owned RGB image from an `image` buffer.
pub fn owned_from_rgb_image(img: &image::RgbImage) -> CgResult<OwnedImage<Rgb8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img
        .as_raw()
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();
    OwnedImage::new(data, width, height)
}

/// Loads an image from disk as RGBA; images without alpha become opaque.
pub fn load_rgba<P: AsRef<Path>>(path: P) -> CgResult<OwnedImage<Rgba8>> {
    let img = image::open(path).map_err(|err| CgError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_rgba_image(&img.to_rgba8())
}

/// Loads an image from disk as RGB, discarding any alpha channel.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> CgResult<OwnedImage<Rgb8>> {
    let img = image::open(path).map_err(|err| CgError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_rgb_image(&img.to_rgb8())
}

/// Encodes an RGBA image as PNG, creating missing parent directories.
pub fn save_rgba_png<P: AsRef<Path>>(img: &OwnedImage<Rgba8>, path: P) -> CgResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| CgError::ImageIo {
                reason: format!("cannot create {}: {err}", parent.display()),
            })?;
        }
    }

    let width = u32::try_from(img.width()).map_err(|_| CgError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| CgError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let raw: Vec<u8> = img.data().iter().flatten().copied().collect();
    let buffer = image::RgbaImage::from_raw(width, height, raw).ok_or(
        CgError::BufferTooSmall {
            needed: img.width() * img.height() * 4,
            got: img.data().len() * 4,
        },
    )?;
    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|err| CgError::ImageIo {
            reason: err.to_string(),
        })
}
