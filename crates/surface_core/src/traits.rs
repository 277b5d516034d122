use crate::error::EvaluationFailure;

/// A real-valued function of two variables that the engine may only sample.
///
/// Implementations must be pure: the algorithms call `evaluate` many times,
/// in no guaranteed order, and assume the same answer for the same point.
pub trait Oracle {
    /// Evaluates f at (x, y).
    /// Non-finite values should be reported as failures; `sample` treats both alike.
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationFailure>;
}

impl<F> Oracle for F
where
    F: Fn(f64, f64) -> f64,
{
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationFailure> {
        let value = self(x, y);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationFailure { x, y })
        }
    }
}

/// Adapts a closure that reports its own failures, such as an evaluator that
/// rejects points outside its domain.
pub struct Fallible<F>(pub F);

impl<F> Oracle for Fallible<F>
where
    F: Fn(f64, f64) -> Result<f64, EvaluationFailure>,
{
    fn evaluate(&self, x: f64, y: f64) -> Result<f64, EvaluationFailure> {
        match (self.0)(x, y) {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(EvaluationFailure { x, y }),
        }
    }
}

/// Samples the oracle, collapsing every kind of failure to `NaN`.
pub fn sample<O: Oracle + ?Sized>(oracle: &O, x: f64, y: f64) -> f64 {
    oracle.evaluate(x, y).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::{sample, Fallible, Oracle};
    use crate::error::EvaluationFailure;

    #[test]
    fn closure_oracle_rejects_non_finite_values() {
        let f = |x: f64, y: f64| x.ln() + y;
        assert!(f.evaluate(1.0, 2.0).is_ok());
        assert_eq!(
            f.evaluate(-1.0, 0.0),
            Err(EvaluationFailure { x: -1.0, y: 0.0 })
        );
        assert!(sample(&f, 0.0, 0.0).is_nan());
    }

    #[test]
    fn fallible_oracle_passes_failures_through() {
        let f = Fallible(|x: f64, y: f64| {
            if x < 0.0 {
                Err(EvaluationFailure { x, y })
            } else {
                Ok(x.sqrt() + y)
            }
        });
        assert_eq!(sample(&f, 4.0, 1.0), 3.0);
        assert!(sample(&f, -4.0, 1.0).is_nan());
    }
}
