//! Binary mask helpers: strided subsampling and 4-connected components.

use std::collections::VecDeque;

/// Row-major boolean mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    bits: Vec<bool>,
    width: usize,
    height: usize,
}

impl Mask {
    /// Wraps `bits`; the length must equal `width * height`.
    pub fn new(bits: Vec<bool>, width: usize, height: usize) -> Option<Self> {
        (bits.len() == width.checked_mul(height)?).then_some(Self {
            bits,
            width,
            height,
        })
    }

    pub(crate) fn from_row_major(bits: Vec<bool>, width: usize, height: usize) -> Self {
        debug_assert_eq!(bits.len(), width * height);
        Self {
            bits,
            width,
            height,
        }
    }

    /// Returns the mask width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the mask height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mask bits in row-major order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Fraction of set bits, 0 for an empty mask.
    pub fn ratio(&self) -> f64 {
        if self.bits.is_empty() {
            return 0.0;
        }
        let set = self.bits.iter().filter(|&&b| b).count();
        set as f64 / self.bits.len() as f64
    }

    /// Keeps every `step`-th row and column starting at the origin.
    ///
    /// The result is `ceil(height / step) x ceil(width / step)`.
    pub fn subsample(&self, step: usize) -> Mask {
        let step = step.max(1);
        let width = self.width.div_ceil(step);
        let height = self.height.div_ceil(step);
        let mut bits = Vec::with_capacity(width * height);
        for y in (0..self.height).step_by(step) {
            let row = &self.bits[y * self.width..(y + 1) * self.width];
            bits.extend(row.iter().step_by(step).copied());
        }
        Mask {
            bits,
            width,
            height,
        }
    }

    /// Size of the largest 4-connected component of set bits.
    pub fn largest_component(&self) -> usize {
        let width = self.width;
        let height = self.height;
        let len = self.bits.len();
        let mut visited = vec![false; len];
        let mut queue = VecDeque::new();
        let mut best = 0usize;

        for start in 0..len {
            if visited[start] || !self.bits[start] {
                continue;
            }
            visited[start] = true;
            queue.push_back(start);
            let mut size = 0usize;

            while let Some(idx) = queue.pop_front() {
                size += 1;
                let x = idx % width;
                let y = idx / width;
                let mut visit = |n: usize| {
                    if !visited[n] && self.bits[n] {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                };
                if x > 0 {
                    visit(idx - 1);
                }
                if x + 1 < width {
                    visit(idx + 1);
                }
                if y > 0 {
                    visit(idx - width);
                }
                if y + 1 < height {
                    visit(idx + width);
                }
            }

            best = best.max(size);
        }

        best
    }

    /// Largest component divided by the total pixel count.
    pub fn largest_component_ratio(&self) -> f64 {
        if self.bits.is_empty() {
            return 0.0;
        }
        self.largest_component() as f64 / self.bits.len() as f64
    }
}
