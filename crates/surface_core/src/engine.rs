//! Per-request choice between an exact backend and the numerical algorithms.
//!
//! The caller passes a [`Mode`] into every operation. With
//! `Mode::Symbolic`, the backend is tried first and any failure falls back to
//! the numerical path, so an operation only fails on malformed input.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cancel::CancelToken;
use crate::critical::{find_critical_points, CriticalPoint};
use crate::derivatives::{analyze_point, PointAnalysis};
use crate::domain::{
    domain_mask, estimate_value_range, probe_limit, DomainMask, LimitEstimate, ValueRange,
};
use crate::error::CalcResult;
use crate::grid::{GridSpec, Range};
use crate::integral::{double_integral, IntegralEstimate, Rect};
use crate::lagrange::{label_candidates, solve_lagrange, ConstraintCandidate, LabeledCandidate};
use crate::range::{pick_safe_range, ExpressionHints};
use crate::settings::AnalysisSettings;
use crate::traits::Oracle;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("operation not supported by the backend")]
    Unsupported,
    #[error("backend failed: {0}")]
    Failed(String),
}

/// An exact solver bound to the expressions under analysis.
///
/// Every method defaults to `Unsupported`, so a backend implements only what
/// it can solve.
pub trait SymbolicBackend {
    fn critical_points(&self) -> Result<Vec<CriticalPoint>, BackendError> {
        Err(BackendError::Unsupported)
    }

    fn constrained_extrema(&self) -> Result<Vec<ConstraintCandidate>, BackendError> {
        Err(BackendError::Unsupported)
    }

    fn double_integral(&self, _rect: &Rect) -> Result<f64, BackendError> {
        Err(BackendError::Unsupported)
    }
}

#[derive(Clone, Copy)]
pub enum Mode<'a> {
    Numeric,
    Symbolic(&'a dyn SymbolicBackend),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Symbolic,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Outcome<T> {
    fn numeric(value: T) -> Self {
        Self {
            value,
            source: Source::Numeric,
        }
    }

    fn symbolic(value: T) -> Self {
        Self {
            value,
            source: Source::Symbolic,
        }
    }
}

/// Runs every operation with one validated settings bundle and one
/// cancellation token.
#[derive(Debug, Clone)]
pub struct Analyzer {
    settings: AnalysisSettings,
    cancel: CancelToken,
}

impl Analyzer {
    pub fn new(settings: AnalysisSettings) -> CalcResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn critical_points<O: Oracle + ?Sized>(
        &self,
        mode: Mode<'_>,
        f: &O,
        hints: &ExpressionHints,
    ) -> CalcResult<Outcome<Vec<CriticalPoint>>> {
        if let Mode::Symbolic(backend) = mode {
            match backend.critical_points() {
                Ok(points) => return Ok(Outcome::symbolic(points)),
                Err(err) => warn!("critical points: falling back to numeric search ({err})"),
            }
        }
        find_critical_points(f, hints, &self.settings.critical, &self.cancel).map(Outcome::numeric)
    }

    /// Candidates labeled relative to each other.
    pub fn constrained_extrema<F, G>(
        &self,
        mode: Mode<'_>,
        f: &F,
        g: &G,
        hints: &ExpressionHints,
    ) -> CalcResult<Outcome<Vec<LabeledCandidate>>>
    where
        F: Oracle + ?Sized,
        G: Oracle + ?Sized,
    {
        let tolerance = self.settings.lagrange.label_tolerance;
        if let Mode::Symbolic(backend) = mode {
            match backend.constrained_extrema() {
                Ok(candidates) => {
                    return Ok(Outcome::symbolic(label_candidates(&candidates, tolerance)))
                }
                Err(err) => warn!("constrained extrema: falling back to numeric search ({err})"),
            }
        }
        let candidates = solve_lagrange(f, g, hints, &self.settings.lagrange, &self.cancel)?;
        Ok(Outcome::numeric(label_candidates(&candidates, tolerance)))
    }

    /// Integrates over `rect`, or over the safe square for `hints` when none is
    /// given. An exact backend result reports a resolution of zero.
    pub fn double_integral<O: Oracle + ?Sized>(
        &self,
        mode: Mode<'_>,
        f: &O,
        rect: Option<Rect>,
        hints: &ExpressionHints,
    ) -> CalcResult<Outcome<IntegralEstimate>> {
        let rect = match rect {
            Some(rect) => Rect::new(rect.x0, rect.x1, rect.y0, rect.y1)?,
            None => Rect::square(pick_safe_range(hints)),
        };
        if let Mode::Symbolic(backend) = mode {
            match backend.double_integral(&rect) {
                Ok(value) => {
                    return Ok(Outcome::symbolic(IntegralEstimate {
                        value,
                        rect,
                        nx: 0,
                        ny: 0,
                        skipped_cells: 0,
                    }))
                }
                Err(err) => warn!("double integral: falling back to midpoint rule ({err})"),
            }
        }
        double_integral(f, rect, &self.settings.integral, &self.cancel).map(Outcome::numeric)
    }

    /// Domain mask over the configured sampling square.
    pub fn domain_mask<O: Oracle + ?Sized>(&self, f: &O) -> CalcResult<DomainMask> {
        let grid = self.sampling_grid(self.settings.sampling.mask_samples)?;
        domain_mask(f, &grid, &grid, &self.cancel)
    }

    pub fn value_range<O: Oracle + ?Sized>(&self, f: &O) -> CalcResult<Option<ValueRange>> {
        let grid = self.sampling_grid(self.settings.sampling.value_range_samples)?;
        estimate_value_range(f, &grid, &grid, &self.cancel)
    }

    pub fn limit<O: Oracle + ?Sized>(&self, f: &O, x0: f64, y0: f64) -> CalcResult<LimitEstimate> {
        probe_limit(f, x0, y0, &self.settings.limit)
    }

    pub fn point<O: Oracle + ?Sized>(&self, f: &O, x: f64, y: f64) -> PointAnalysis {
        analyze_point(f, x, y, self.settings.critical.step)
    }

    fn sampling_grid(&self, count: usize) -> CalcResult<GridSpec> {
        GridSpec::over(Range::symmetric(self.settings.sampling.half_width), count)
    }
}
