//! Coarse-to-fine pass schedule.

use crate::align::AlignParams;
use crate::border::BorderSet;
use crate::image::{ImageView, Rgba8};
use crate::kernel::scalar::scan_grid;
use crate::kernel::{Grid, GridBest};
use crate::trace::trace_debug;
use crate::util::math::MAX_PIXEL_DISTANCE;

#[cfg(feature = "rayon")]
use crate::kernel::rayon::scan_grid_par;

/// Runs passes until both axes have been scanned at step 1.
///
/// Offsets range over `[0, x_range] x [0, y_range]`. The starting best is
/// `(0, 0)` at the worst possible distance, so any placement with at least one
/// border pixel on canvas replaces it.
pub(crate) fn coarse_to_fine(
    base: ImageView<'_, Rgba8>,
    border: &BorderSet,
    x_range: usize,
    y_range: usize,
    params: &AlignParams,
    parallel: bool,
) -> GridBest {
    let mut best = GridBest {
        distance: MAX_PIXEL_DISTANCE * border.len() as u64,
        dx: 0,
        dy: 0,
    };

    let mut x = Axis::new(x_range, params);
    let mut y = Axis::new(y_range, params);
    let mut pass = 0usize;

    while x.refining || y.refining {
        let grid = Grid {
            x_start: x.start,
            x_end: x.end,
            x_step: x.step,
            y_start: y.start,
            y_end: y.end,
            y_step: y.step,
        };
        best = scan(base, border, grid, best, parallel);
        pass += 1;
        trace_debug!(
            "align_pass",
            pass = pass,
            x_step = x.step,
            y_step = y.step,
            distance = best.distance,
            dx = best.dx,
            dy = best.dy
        );

        x.narrow(best.dx, params);
        y.narrow(best.dy, params);
    }
    best
}

/// Window and step along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Axis {
    start: usize,
    end: usize,
    step: usize,
    range: usize,
    refining: bool,
}

impl Axis {
    fn new(range: usize, params: &AlignParams) -> Self {
        Self {
            start: 0,
            end: range,
            step: (range / params.step_divisor).min(params.init_step).max(1),
            range,
            refining: true,
        }
    }

    /// Centers the window on `best` and derives the next step.
    ///
    /// An axis already at step 1 stops refining. Steps never grow, so every
    /// schedule terminates.
    fn narrow(&mut self, best: usize, params: &AlignParams) {
        let reach = self.step.saturating_mul(params.ext_scale);
        self.start = best.saturating_sub(reach);
        self.end = best.saturating_add(reach).min(self.range);

        if self.step == 1 {
            self.refining = false;
            return;
        }
        let window = self.end - self.start;
        self.step = (window / params.step_divisor).clamp(1, self.step - 1);
    }
}

#[cfg(feature = "rayon")]
fn scan(
    base: ImageView<'_, Rgba8>,
    border: &BorderSet,
    grid: Grid,
    best: GridBest,
    parallel: bool,
) -> GridBest {
    if parallel {
        scan_grid_par(base, border, grid, best)
    } else {
        scan_grid(base, border, grid, best)
    }
}

#[cfg(not(feature = "rayon"))]
fn scan(
    base: ImageView<'_, Rgba8>,
    border: &BorderSet,
    grid: Grid,
    best: GridBest,
    _parallel: bool,
) -> GridBest {
    scan_grid(base, border, grid, best)
}
