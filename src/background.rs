//! Background color detection and removal for diff images.
//!
//! Diff overlays are delivered on a flat fill. Detection finds the most common
//! coarse color among opaque pixels; clearing turns every pixel close enough to
//! the fill fully transparent so only the painted region is left for
//! alignment.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::features::modal_bucket;
use crate::image::{rgb_of, ImageView, OwnedImage, Rgb8, Rgba8};
use crate::kernel::ClearRule;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{luma_f64, pack_quantized};
use crate::util::{CgError, CgResult};

#[cfg(not(feature = "rayon"))]
use crate::kernel::ClearKernel;

#[cfg(all(not(feature = "rayon"), not(feature = "simd")))]
use crate::kernel::scalar::ClearScalar as ClearImpl;
#[cfg(all(not(feature = "rayon"), feature = "simd"))]
use crate::kernel::simd::ClearSimd as ClearImpl;

/// Quantization bucket width used by detection (8 levels per channel).
pub const DETECT_BUCKET: u8 = 32;
/// Reconstructed colors darker than this are reported as black.
pub const DARK_LUMA: f64 = 30.0;
/// Reconstructed colors brighter than this are reported as white.
pub const LIGHT_LUMA: f64 = 225.0;

/// Coarse classification of a detected background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BgKind {
    Black,
    White,
    Custom,
}

/// Result of background detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectedBackground {
    pub kind: BgKind,
    /// Midpoint of the modal quantization bucket.
    pub rgb: Rgb8,
}

/// Finds the dominant color among pixels with non-zero alpha.
///
/// A fully transparent image reports black `(0, 0, 0)`.
pub fn detect_bg_color(img: ImageView<'_, Rgba8>) -> DetectedBackground {
    let levels = 256 / usize::from(DETECT_BUCKET);
    let mut counts = vec![0usize; levels * levels * levels];
    let mut opaque = 0usize;
    for row in img.rows() {
        for &px in row {
            if px[3] > 0 {
                counts[pack_quantized(rgb_of(px), DETECT_BUCKET)] += 1;
                opaque += 1;
            }
        }
    }
    if opaque == 0 {
        return DetectedBackground {
            kind: BgKind::Black,
            rgb: [0, 0, 0],
        };
    }

    let (packed, _) = modal_bucket(&counts);
    let half = DETECT_BUCKET / 2;
    let channel = |q: usize| (q as u8) * DETECT_BUCKET + half;
    let rgb = [
        channel(packed / (levels * levels)),
        channel((packed / levels) % levels),
        channel(packed % levels),
    ];

    let luma = luma_f64(rgb);
    let kind = if luma < DARK_LUMA {
        BgKind::Black
    } else if luma > LIGHT_LUMA {
        BgKind::White
    } else {
        BgKind::Custom
    };
    trace_event!("detected_background", r = rgb[0], g = rgb[1], b = rgb[2]);
    DetectedBackground { kind, rgb }
}

/// How `clear_color` decides that a pixel is background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BgMode {
    /// Distance to the target color within the tolerance.
    #[default]
    Match,
    /// Dark pixels: RGB length below the tolerance, target ignored.
    Norm,
}

impl BgMode {
    /// Lower-case name used in configuration strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            BgMode::Match => "match",
            BgMode::Norm => "norm",
        }
    }
}

impl fmt::Display for BgMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BgMode {
    type Err = CgError;

    fn from_str(s: &str) -> CgResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "match" => Ok(BgMode::Match),
            "norm" => Ok(BgMode::Norm),
            _ => Err(CgError::InvalidParams("background mode must be match or norm")),
        }
    }
}

/// An explicit background color parsed from a user-facing string.
///
/// Accepts `black`, `white`, `#RRGGBB`, `#RGB` and `rgb(r, g, b)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BackgroundColor(pub Rgb8);

impl BackgroundColor {
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255]);

    pub fn rgb(&self) -> Rgb8 {
        self.0
    }
}

static RGB_FN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgb\s*\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").expect("rgb pattern is valid")
});

impl FromStr for BackgroundColor {
    type Err = CgError;

    fn from_str(s: &str) -> CgResult<Self> {
        let norm = s.trim().to_ascii_lowercase();
        let invalid = || CgError::InvalidColor {
            input: s.to_string(),
        };

        match norm.as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            _ => {}
        }

        if let Some(hex) = norm.strip_prefix('#') {
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            return match hex.len() {
                6 => {
                    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                    match (channel(0), channel(2), channel(4)) {
                        (Ok(r), Ok(g), Ok(b)) => Ok(Self([r, g, b])),
                        _ => Err(invalid()),
                    }
                }
                3 => {
                    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                    match (nibble(0), nibble(1), nibble(2)) {
                        (Ok(r), Ok(g), Ok(b)) => Ok(Self([r, g, b])),
                        _ => Err(invalid()),
                    }
                }
                _ => Err(invalid()),
            };
        }

        let caps = RGB_FN_RE.captures(&norm).ok_or_else(invalid)?;
        let channel = |i: usize| caps[i].parse::<u8>().map_err(|_| invalid());
        Ok(Self([channel(1)?, channel(2)?, channel(3)?]))
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Builds the pixel rule for a target, tolerance and mode.
///
/// Both modes use `tolerance^2 * 3` as the squared threshold.
pub fn clear_rule(target: Rgb8, tolerance: u8, mode: BgMode) -> ClearRule {
    let tol = u32::from(tolerance);
    let threshold_sq = tol * tol * 3;
    match mode {
        BgMode::Match => ClearRule::Match {
            target,
            threshold_sq,
        },
        BgMode::Norm => ClearRule::Norm { threshold_sq },
    }
}

/// Clears background pixels in place, returning how many were cleared.
///
/// Cleared pixels become `[0, 0, 0, 0]`; every other pixel is untouched.
pub fn clear_color(
    img: &mut OwnedImage<Rgba8>,
    target: Rgb8,
    tolerance: u8,
    mode: BgMode,
) -> usize {
    let _span = trace_span!("clear_color", tolerance = tolerance, mode = mode.as_str()).entered();
    let rule = clear_rule(target, tolerance, mode);

    #[cfg(feature = "rayon")]
    let cleared = crate::kernel::rayon::clear_par(img.data_mut(), rule);
    #[cfg(not(feature = "rayon"))]
    let cleared = ClearImpl::clear(img.data_mut(), rule);

    trace_event!("cleared", pixels = cleared);
    cleared
}
