//! Midpoint-rule double integrals on a rectangle.
//!
//! The estimate is first order: fixed resolution, no adaptivity, no error
//! estimate. Integrands that are discontinuous or undefined near the boundary
//! of their domain are biased, since undefined cells silently contribute zero.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::{CalcError, CalcResult};
use crate::grid::Range;
use crate::settings::IntegralSettings;
use crate::traits::{sample, Oracle};

/// Integration rectangle `[x0, x1] × [y0, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> CalcResult<Self> {
        Range::new(x0, x1)?;
        Range::new(y0, y1)?;
        Ok(Self { x0, x1, y0, y1 })
    }

    /// `range × range`, the default bounds when a caller gives none.
    pub fn square(range: Range) -> Self {
        Self {
            x0: range.min,
            x1: range.max,
            y0: range.min,
            y1: range.max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegralEstimate {
    pub value: f64,
    pub rect: Rect,
    pub nx: usize,
    pub ny: usize,
    /// Cells whose midpoint was undefined and contributed nothing.
    pub skipped_cells: usize,
}

/// Row-by-row midpoint summation, for callers that interleave the work with
/// other tasks. [`double_integral`] drives it to completion.
#[derive(Debug, Clone)]
pub struct IntegralAccumulator {
    rect: Rect,
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    next_row: usize,
    sum: f64,
    skipped_cells: usize,
}

impl IntegralAccumulator {
    pub fn new(rect: Rect, settings: &IntegralSettings) -> CalcResult<Self> {
        let rect = Rect::new(rect.x0, rect.x1, rect.y0, rect.y1)?;
        for count in [settings.nx, settings.ny] {
            if count == 0 {
                return Err(CalcError::InvalidResolution { count, required: 1 });
            }
        }
        Ok(Self {
            rect,
            nx: settings.nx,
            ny: settings.ny,
            dx: (rect.x1 - rect.x0) / settings.nx as f64,
            dy: (rect.y1 - rect.y0) / settings.ny as f64,
            next_row: 0,
            sum: 0.0,
            skipped_cells: 0,
        })
    }

    pub fn is_done(&self) -> bool {
        self.next_row >= self.ny
    }

    pub fn rows_done(&self) -> usize {
        self.next_row
    }

    pub fn rows_total(&self) -> usize {
        self.ny
    }

    /// Sums up to `rows` more rows; returns how many were processed.
    pub fn accumulate_rows<O: Oracle + ?Sized>(&mut self, f: &O, rows: usize) -> usize {
        let end = (self.next_row + rows).min(self.ny);
        let processed = end - self.next_row;
        let cell = self.dx * self.dy;
        for j in self.next_row..end {
            let y = self.rect.y0 + (j as f64 + 0.5) * self.dy;
            for i in 0..self.nx {
                let x = self.rect.x0 + (i as f64 + 0.5) * self.dx;
                let value = sample(f, x, y);
                if value.is_finite() {
                    self.sum += value * cell;
                } else {
                    self.skipped_cells += 1;
                }
            }
        }
        self.next_row = end;
        processed
    }

    /// The estimate over the rows summed so far.
    pub fn estimate(&self) -> IntegralEstimate {
        IntegralEstimate {
            value: self.sum,
            rect: self.rect,
            nx: self.nx,
            ny: self.ny,
            skipped_cells: self.skipped_cells,
        }
    }
}

pub fn double_integral<O: Oracle + ?Sized>(
    f: &O,
    rect: Rect,
    settings: &IntegralSettings,
    cancel: &CancelToken,
) -> CalcResult<IntegralEstimate> {
    let mut accumulator = IntegralAccumulator::new(rect, settings)?;
    while !accumulator.is_done() {
        cancel.check()?;
        accumulator.accumulate_rows(f, 1);
    }
    Ok(accumulator.estimate())
}

#[cfg(test)]
mod tests {
    use super::{double_integral, IntegralAccumulator, Rect};
    use crate::cancel::CancelToken;
    use crate::error::CalcError;
    use crate::settings::IntegralSettings;
    use approx::assert_abs_diff_eq;

    fn integrate(f: impl Fn(f64, f64) -> f64, rect: Rect, nx: usize, ny: usize) -> f64 {
        double_integral(&f, rect, &IntegralSettings { nx, ny }, &CancelToken::new())
            .expect("integral should run")
            .value
    }

    #[test]
    fn constant_integrand_is_exact_at_any_resolution() {
        let rect = Rect::new(0.0, 2.0, 0.0, 3.0).expect("valid rect");
        for (nx, ny) in [(1, 1), (7, 3), (60, 60), (13, 101)] {
            assert_abs_diff_eq!(integrate(|_, _| 1.0, rect, nx, ny), 6.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn bilinear_integrand_is_exact_for_midpoint_rule() {
        let rect = Rect::new(0.0, 1.0, 0.0, 2.0).expect("valid rect");
        // ∫∫ x·y = (1/2)·(4/2) = 1
        assert_abs_diff_eq!(integrate(|x, y| x * y, rect, 10, 10), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn quadratic_converges_at_default_resolution() {
        let rect = Rect::new(-1.0, 1.0, -1.0, 1.0).expect("valid rect");
        // ∫∫ (x² + y²) over [-1,1]² = 8/3
        let value = integrate(|x, y| x * x + y * y, rect, 60, 60);
        assert_abs_diff_eq!(value, 8.0 / 3.0, epsilon = 1e-3);
    }

    #[test]
    fn undefined_cells_contribute_zero() {
        let rect = Rect::new(-1.0, 1.0, 0.0, 1.0).expect("valid rect");
        let f = |x: f64, _y: f64| x.sqrt();
        let estimate = double_integral(
            &f,
            rect,
            &IntegralSettings { nx: 40, ny: 10 },
            &CancelToken::new(),
        )
        .expect("integral should run");
        assert_eq!(estimate.skipped_cells, 20 * 10);
        // ∫₀¹ √x dx = 2/3
        assert_abs_diff_eq!(estimate.value, 2.0 / 3.0, epsilon = 1e-2);
    }

    #[test]
    fn accumulator_matches_one_shot_integral() {
        let rect = Rect::new(0.0, 1.0, 0.0, 1.0).expect("valid rect");
        let settings = IntegralSettings { nx: 20, ny: 20 };
        let f = |x: f64, y: f64| (x + y).exp();
        let mut accumulator = IntegralAccumulator::new(rect, &settings).expect("valid");
        let mut batches = 0;
        while !accumulator.is_done() {
            accumulator.accumulate_rows(&f, 7);
            batches += 1;
        }
        assert_eq!(batches, 3);
        let whole = double_integral(&f, rect, &settings, &CancelToken::new()).expect("valid");
        assert_eq!(accumulator.estimate(), whole);
    }

    #[test]
    fn cancelled_integral_stops() {
        let token = CancelToken::new();
        token.cancel();
        let rect = Rect::new(0.0, 1.0, 0.0, 1.0).expect("valid rect");
        let result = double_integral(
            &|x: f64, y: f64| x * y,
            rect,
            &IntegralSettings::default(),
            &token,
        );
        assert_eq!(result, Err(CalcError::Cancelled));
    }

    #[test]
    fn malformed_bounds_fail_fast() {
        assert_eq!(
            Rect::new(1.0, 0.0, 0.0, 1.0),
            Err(CalcError::InvalidRange { min: 1.0, max: 0.0 })
        );
        let rect = Rect::new(0.0, 1.0, 0.0, 1.0).expect("valid rect");
        let result = double_integral(
            &|x: f64, _y: f64| x,
            rect,
            &IntegralSettings { nx: 0, ny: 5 },
            &CancelToken::new(),
        );
        assert_eq!(
            result,
            Err(CalcError::InvalidResolution {
                count: 0,
                required: 1
            })
        );
    }
}
