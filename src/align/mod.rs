//! Translation search that places a background-cleared diff on its base.
//!
//! Only the diff's border pixels are scored. The search is coarse-to-fine:
//! a strided grid over the full offset range, then repeatedly narrower
//! windows around the current best with smaller steps until both axes are
//! scanned at step 1.

mod search;

use std::fmt;
use std::str::FromStr;

use crate::border::{extract_border, BorderSet};
use crate::image::{ImageView, Rgba8};
use crate::trace::{trace_event, trace_span};
use crate::util::math::MAX_PIXEL_DISTANCE;
use crate::util::{CgError, CgResult};

/// Step schedule for the coarse-to-fine search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AlignParams {
    /// Upper bound on the first pass step along each axis.
    pub init_step: usize,
    /// Window length is divided by this to get the next step.
    pub step_divisor: usize,
    /// Window half-width after each pass, in multiples of the current step.
    pub ext_scale: usize,
}

impl AlignParams {
    /// Large first steps; fast on big canvases.
    pub const fn fast() -> Self {
        Self {
            init_step: 20,
            step_divisor: 10,
            ext_scale: 2,
        }
    }

    /// Exhaustive step-1 scan of the whole range.
    pub const fn precise() -> Self {
        Self {
            init_step: 1,
            step_divisor: 3,
            ext_scale: 1,
        }
    }

    /// Rejects schedules that cannot make progress.
    pub fn validate(&self) -> CgResult<()> {
        if self.init_step == 0 {
            return Err(CgError::InvalidParams("init_step must be >= 1"));
        }
        if self.step_divisor == 0 {
            return Err(CgError::InvalidParams("step_divisor must be >= 1"));
        }
        Ok(())
    }
}

impl Default for AlignParams {
    fn default() -> Self {
        Self::fast()
    }
}

/// Named presets for [`AlignParams`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlignMode {
    #[default]
    Fast,
    Precise,
}

impl AlignMode {
    pub fn params(self) -> AlignParams {
        match self {
            AlignMode::Fast => AlignParams::fast(),
            AlignMode::Precise => AlignParams::precise(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlignMode::Fast => "fast",
            AlignMode::Precise => "precise",
        }
    }
}

impl fmt::Display for AlignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignMode {
    type Err = CgError;

    fn from_str(s: &str) -> CgResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(AlignMode::Fast),
            "precise" => Ok(AlignMode::Precise),
            _ => Err(CgError::InvalidParams("alignment mode must be fast or precise")),
        }
    }
}

/// Best placement of a diff on its base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentResult {
    /// Column of the diff's top-left corner on the base.
    pub dx: i64,
    /// Row of the diff's top-left corner on the base.
    pub dy: i64,
    /// Sum of squared RGB distances over all border pixels.
    pub distance: u64,
    /// Match quality in `[0, 100]`; 100 is a perfect fit.
    pub fit_percent: f64,
    /// Number of border pixels scored.
    pub border_pixel_count: usize,
}

/// Converts a border distance into a fit percentage.
///
/// `(1 - sqrt(distance / (n * MAX_PIXEL_DISTANCE))) * 100`; an empty border
/// is a perfect fit.
pub fn fit_percent(distance: u64, border_pixel_count: usize) -> f64 {
    if border_pixel_count == 0 {
        return 100.0;
    }
    let worst = border_pixel_count as f64 * MAX_PIXEL_DISTANCE as f64;
    (1.0 - (distance as f64 / worst).sqrt()) * 100.0
}

/// Coarse-to-fine border aligner.
///
/// With the `rayon` feature, grid passes are evaluated column-parallel unless
/// disabled with [`Aligner::with_parallel`]; results are identical either way.
#[derive(Clone, Copy, Debug)]
pub struct Aligner {
    params: AlignParams,
    parallel: bool,
}

impl Aligner {
    /// Creates an aligner after validating `params`.
    pub fn new(params: AlignParams) -> CgResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            parallel: cfg!(feature = "rayon"),
        })
    }

    /// Aligner for a named preset.
    pub fn with_mode(mode: AlignMode) -> Self {
        Self {
            params: mode.params(),
            parallel: cfg!(feature = "rayon"),
        }
    }

    /// Enables or disables parallel grid evaluation.
    ///
    /// Has no effect without the `rayon` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn params(&self) -> AlignParams {
        self.params
    }

    /// Aligns a cleared diff image against `base`.
    ///
    /// The base alpha channel is ignored.
    pub fn align(
        &self,
        base: ImageView<'_, Rgba8>,
        diff: ImageView<'_, Rgba8>,
    ) -> AlignmentResult {
        let border = extract_border(diff);
        self.align_border(base, &border, diff.width(), diff.height())
    }

    /// Aligns a precomputed border set of a `diff_width` x `diff_height` diff.
    pub fn align_border(
        &self,
        base: ImageView<'_, Rgba8>,
        border: &BorderSet,
        diff_width: usize,
        diff_height: usize,
    ) -> AlignmentResult {
        let n = border.len();
        let _span = trace_span!("align", border_pixels = n, parallel = self.parallel).entered();

        if n == 0 {
            trace_event!("align_skipped", reason = "empty border");
            return AlignmentResult {
                dx: 0,
                dy: 0,
                distance: 0,
                fit_percent: 100.0,
                border_pixel_count: 0,
            };
        }

        let (Some(x_range), Some(y_range)) = (
            base.width().checked_sub(diff_width),
            base.height().checked_sub(diff_height),
        ) else {
            trace_event!("align_skipped", reason = "diff larger than base");
            return AlignmentResult {
                dx: 0,
                dy: 0,
                distance: MAX_PIXEL_DISTANCE * n as u64,
                fit_percent: 0.0,
                border_pixel_count: n,
            };
        };

        let best = search::coarse_to_fine(
            base,
            border,
            x_range,
            y_range,
            &self.params,
            self.parallel,
        );
        let result = AlignmentResult {
            dx: best.dx as i64,
            dy: best.dy as i64,
            distance: best.distance,
            fit_percent: fit_percent(best.distance, n),
            border_pixel_count: n,
        };
        trace_event!(
            "aligned",
            dx = result.dx,
            dy = result.dy,
            distance = result.distance,
            fit_percent = result.fit_percent
        );
        result
    }
}

impl Default for Aligner {
    fn default() -> Self {
        Self::with_mode(AlignMode::Fast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::OwnedImage;

    #[test]
    fn fit_percent_bounds() {
        assert_eq!(fit_percent(0, 0), 100.0);
        assert_eq!(fit_percent(0, 10), 100.0);
        assert!((fit_percent(MAX_PIXEL_DISTANCE * 4, 4)).abs() < 1e-12);
        let quarter = fit_percent(MAX_PIXEL_DISTANCE, 4);
        assert!((quarter - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_params() {
        let zero_step = AlignParams {
            init_step: 0,
            ..AlignParams::fast()
        };
        assert!(Aligner::new(zero_step).is_err());
        let zero_div = AlignParams {
            step_divisor: 0,
            ..AlignParams::fast()
        };
        assert_eq!(
            zero_div.validate(),
            Err(CgError::InvalidParams("step_divisor must be >= 1"))
        );
        assert!(Aligner::new(AlignParams::precise()).is_ok());
    }

    #[test]
    fn mode_presets_and_parsing() {
        assert_eq!(AlignMode::Fast.params(), AlignParams::fast());
        assert_eq!(AlignMode::Precise.params().init_step, 1);
        assert_eq!("PRECISE".parse::<AlignMode>(), Ok(AlignMode::Precise));
        assert!("slow".parse::<AlignMode>().is_err());
        assert_eq!(AlignMode::Fast.to_string(), "fast");
    }

    #[test]
    fn empty_border_is_perfect_fit() {
        let base = OwnedImage::filled(8, 8, [1u8, 2, 3, 255]).unwrap();
        let diff = OwnedImage::filled(4, 4, [0u8, 0, 0, 0]).unwrap();
        let res = Aligner::default().align(base.view(), diff.view());
        assert_eq!((res.dx, res.dy, res.distance), (0, 0, 0));
        assert_eq!(res.fit_percent, 100.0);
        assert_eq!(res.border_pixel_count, 0);
    }

    #[test]
    fn oversized_diff_scores_worst() {
        let base = OwnedImage::filled(4, 4, [0u8, 0, 0, 255]).unwrap();
        let diff = OwnedImage::filled(5, 3, [0u8, 0, 0, 255]).unwrap();
        let res = Aligner::default().align(base.view(), diff.view());
        assert_eq!((res.dx, res.dy), (0, 0));
        assert_eq!(res.border_pixel_count, 12);
        assert_eq!(res.distance, 12 * MAX_PIXEL_DISTANCE);
        assert_eq!(res.fit_percent, 0.0);
    }

    #[test]
    fn finds_unique_patch() {
        let mut base = OwnedImage::filled(40, 30, [10u8, 10, 10, 255]).unwrap();
        for y in 12..17 {
            for x in 21..27 {
                base.data_mut()[y * 40 + x] = [200, 50, 50, 255];
            }
        }
        let diff = OwnedImage::filled(6, 5, [200u8, 50, 50, 255]).unwrap();
        for mode in [AlignMode::Fast, AlignMode::Precise] {
            let res = Aligner::with_mode(mode).align(base.view(), diff.view());
            assert_eq!((res.dx, res.dy), (21, 12), "{mode}");
            assert_eq!(res.distance, 0);
        }
    }
}
