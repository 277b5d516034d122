use thiserror::Error;

/// Signal that the oracle could not produce a finite value at a point.
///
/// Algorithms never propagate this; `traits::sample` folds it into `NaN` so the
/// point is simply excluded from further arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("function could not be evaluated at ({x}, {y})")]
pub struct EvaluationFailure {
    pub x: f64,
    pub y: f64,
}

/// Hard failures. Reserved for malformed input and cancellation; numerically
/// difficult functions produce partial results instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid range: min ({min}) must be finite and strictly less than max ({max})")]
    InvalidRange { min: f64, max: f64 },
    #[error("invalid resolution: {count} samples requested, need at least {required}")]
    InvalidResolution { count: usize, required: usize },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("operation cancelled")]
    Cancelled,
}

pub type CalcResult<T> = Result<T, CalcError>;
