//! Per-pair engine: clear the diff background, align, composite.
//!
//! Each pair is independent. [`process_images`] works on decoded buffers;
//! [`process_pair`] (feature `image-io`) adds loading and PNG output around it.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::align::{AlignMode, AlignParams, Aligner, AlignmentResult};
use crate::background::{clear_color, detect_bg_color, BgMode};
use crate::composite::composite_over;
use crate::image::{OwnedImage, Rgb8, Rgba8};
use crate::trace::{trace_event, trace_span};

#[cfg(feature = "image-io")]
use crate::pairing::PairJob;
#[cfg(feature = "image-io")]
use std::path::Path;

/// Tag identifying which stage failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailReason {
    ReadFailure,
    SizeInvalid,
    BackgroundRemovalFailure,
    AlignmentFailure,
    WriteFailure,
}

impl FailReason {
    /// Stable snake_case name for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailReason::ReadFailure => "read_fail",
            FailReason::SizeInvalid => "size_invalid",
            FailReason::BackgroundRemovalFailure => "bg_remove_fail",
            FailReason::AlignmentFailure => "align_fail",
            FailReason::WriteFailure => "write_fail",
        }
    }
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single pair. Never affects other pairs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("failed to read {which} image: {message}")]
    Read { which: &'static str, message: String },
    #[error("diff ({diff_width}x{diff_height}) larger than base ({base_width}x{base_height})")]
    SizeInvalid {
        base_width: usize,
        base_height: usize,
        diff_width: usize,
        diff_height: usize,
    },
    #[error("background removal failed: {0}")]
    BackgroundRemoval(String),
    #[error("alignment failed: {0}")]
    Alignment(String),
    #[error("failed to write output: {0}")]
    Write(String),
}

impl PairError {
    pub fn reason(&self) -> FailReason {
        match self {
            PairError::Read { .. } => FailReason::ReadFailure,
            PairError::SizeInvalid { .. } => FailReason::SizeInvalid,
            PairError::BackgroundRemoval(_) => FailReason::BackgroundRemovalFailure,
            PairError::Alignment(_) => FailReason::AlignmentFailure,
            PairError::Write(_) => FailReason::WriteFailure,
        }
    }
}

/// Per-pair processing options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairConfig {
    /// Background tolerance; the squared threshold is `tolerance^2 * 3`.
    pub tolerance: u8,
    pub bg_mode: BgMode,
    /// Explicit background color; detected from the diff when `None`.
    pub bg_color: Option<Rgb8>,
    pub align_mode: AlignMode,
    /// Overrides the `align_mode` preset when set.
    pub align_params: Option<AlignParams>,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            tolerance: 30,
            bg_mode: BgMode::Match,
            bg_color: None,
            align_mode: AlignMode::Fast,
            align_params: None,
        }
    }
}

impl PairConfig {
    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_bg_mode(mut self, mode: BgMode) -> Self {
        self.bg_mode = mode;
        self
    }

    pub fn with_bg_color(mut self, color: Option<Rgb8>) -> Self {
        self.bg_color = color;
        self
    }

    pub fn with_align_mode(mut self, mode: AlignMode) -> Self {
        self.align_mode = mode;
        self
    }

    pub fn with_align_params(mut self, params: AlignParams) -> Self {
        self.align_params = Some(params);
        self
    }

    /// Effective alignment schedule.
    pub fn effective_align_params(&self) -> AlignParams {
        self.align_params.unwrap_or_else(|| self.align_mode.params())
    }
}

/// Summary of a successfully processed pair.
#[derive(Clone, Debug, PartialEq)]
pub struct PairOutcome {
    pub alignment: AlignmentResult,
    /// Where the composite was written; `None` for in-memory processing.
    pub output_path: Option<PathBuf>,
    /// Background color that was cleared from the diff.
    pub background: Rgb8,
    pub cleared_pixels: usize,
    pub elapsed: Duration,
}

/// Composite image together with its outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedPair {
    pub image: OwnedImage<Rgba8>,
    pub outcome: PairOutcome,
}

/// Runs background removal, alignment and compositing on decoded images.
///
/// `diff` is consumed since its background is cleared in place.
pub fn process_images(
    base: &OwnedImage<Rgba8>,
    mut diff: OwnedImage<Rgba8>,
    cfg: &PairConfig,
) -> Result<ProcessedPair, PairError> {
    let start = Instant::now();
    let _span = trace_span!(
        "process_images",
        base_width = base.width(),
        base_height = base.height(),
        diff_width = diff.width(),
        diff_height = diff.height()
    )
    .entered();

    if diff.width() > base.width() || diff.height() > base.height() {
        return Err(PairError::SizeInvalid {
            base_width: base.width(),
            base_height: base.height(),
            diff_width: diff.width(),
            diff_height: diff.height(),
        });
    }

    let aligner = Aligner::new(cfg.effective_align_params())
        .map_err(|err| PairError::Alignment(err.to_string()))?;

    let background = cfg
        .bg_color
        .unwrap_or_else(|| detect_bg_color(diff.view()).rgb);
    let cleared_pixels = clear_color(&mut diff, background, cfg.tolerance, cfg.bg_mode);

    let alignment = aligner.align(base.view(), diff.view());
    let image = composite_over(base, diff.view(), alignment.dx, alignment.dy);

    let elapsed = start.elapsed();
    trace_event!(
        "pair_done",
        dx = alignment.dx,
        dy = alignment.dy,
        fit_percent = alignment.fit_percent,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0
    );
    Ok(ProcessedPair {
        image,
        outcome: PairOutcome {
            alignment,
            output_path: None,
            background,
            cleared_pixels,
            elapsed,
        },
    })
}

/// Loads a job's images, processes them and writes the composite as PNG to
/// `output_root / job.output_rel_path`.
///
/// Missing parent directories are created.
#[cfg(feature = "image-io")]
pub fn process_pair(
    job: &PairJob,
    output_root: &Path,
    cfg: &PairConfig,
) -> Result<PairOutcome, PairError> {
    use crate::image::io::{load_rgba, save_rgba_png};

    let start = Instant::now();
    let output_path = output_root.join(&job.output_rel_path);
    let _span = trace_span!("process_pair", output = &*output_path.to_string_lossy()).entered();

    let base = load_rgba(&job.base_path).map_err(|err| PairError::Read {
        which: "base",
        message: err.to_string(),
    })?;
    let diff = load_rgba(&job.diff_path).map_err(|err| PairError::Read {
        which: "diff",
        message: err.to_string(),
    })?;

    let ProcessedPair { image, mut outcome } = process_images(&base, diff, cfg)?;
    save_rgba_png(&image, &output_path).map_err(|err| PairError::Write(err.to_string()))?;

    outcome.output_path = Some(output_path);
    outcome.elapsed = start.elapsed();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_match_variants() {
        let err = PairError::Read {
            which: "base",
            message: "missing".into(),
        };
        assert_eq!(err.reason(), FailReason::ReadFailure);
        assert_eq!(err.to_string(), "failed to read base image: missing");
        assert_eq!(
            PairError::Write("disk full".into()).reason().as_str(),
            "write_fail"
        );
        assert_eq!(
            PairError::BackgroundRemoval(String::new()).reason(),
            FailReason::BackgroundRemovalFailure
        );
    }

    #[test]
    fn oversized_diff_is_rejected() {
        let base = OwnedImage::filled(10, 10, [0u8, 0, 0, 255]).unwrap();
        let diff = OwnedImage::filled(11, 4, [0u8, 0, 0, 255]).unwrap();
        let err = process_images(&base, diff, &PairConfig::default()).unwrap_err();
        assert_eq!(err.reason(), FailReason::SizeInvalid);
        assert_eq!(err.to_string(), "diff (11x4) larger than base (10x10)");
    }

    #[test]
    fn bad_align_params_fail_alignment() {
        let base = OwnedImage::filled(10, 10, [0u8, 0, 0, 255]).unwrap();
        let diff = OwnedImage::filled(4, 4, [0u8, 0, 0, 255]).unwrap();
        let cfg = PairConfig::default().with_align_params(AlignParams {
            init_step: 0,
            step_divisor: 10,
            ext_scale: 2,
        });
        let err = process_images(&base, diff, &cfg).unwrap_err();
        assert_eq!(err.reason(), FailReason::AlignmentFailure);
    }

    #[test]
    fn fully_cleared_diff_returns_base() {
        let base = OwnedImage::filled(6, 6, [40u8, 80, 120, 255]).unwrap();
        let diff = OwnedImage::filled(3, 3, [0u8, 0, 0, 255]).unwrap();
        let out = process_images(&base, diff, &PairConfig::default()).unwrap();
        assert_eq!(out.outcome.cleared_pixels, 9);
        assert_eq!(out.outcome.alignment.border_pixel_count, 0);
        assert_eq!(out.outcome.alignment.fit_percent, 100.0);
        assert_eq!(out.image, base);
    }

    #[test]
    fn config_builders() {
        let cfg = PairConfig::default()
            .with_tolerance(5)
            .with_bg_mode(BgMode::Norm)
            .with_bg_color(Some([1, 2, 3]))
            .with_align_mode(AlignMode::Precise);
        assert_eq!(cfg.tolerance, 5);
        assert_eq!(cfg.bg_color, Some([1, 2, 3]));
        assert_eq!(cfg.effective_align_params(), AlignParams::precise());
        assert_eq!(PairConfig::default().tolerance, 30);
    }
}
