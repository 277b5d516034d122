//! Unconstrained stationary points: grid seeding, Newton refinement on the
//! gradient, and the second-derivative test.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::derivatives::{gradient, hessian, Hessian};
use crate::error::CalcResult;
use crate::grid::{distance, GridSpec, Range};
use crate::range::{pick_safe_range, ExpressionHints};
use crate::settings::{CriticalPointSettings, NewtonSettings};
use crate::traits::{sample, Oracle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Minimum,
    Maximum,
    Saddle,
    Inconclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalPoint {
    pub x: f64,
    pub y: f64,
    /// `NaN` when f is undefined at the refined location.
    pub f: f64,
    pub classification: Classification,
    pub determinant: f64,
    pub hessian: Hessian,
}

/// Second-derivative test on `D = fxx·fyy − fxy²`.
/// An undefined Hessian is inconclusive.
pub fn classify(hessian: &Hessian, tolerance: f64) -> Classification {
    let det = hessian.determinant();
    if !det.is_finite() {
        Classification::Inconclusive
    } else if det > tolerance && hessian.fxx > 0.0 {
        Classification::Minimum
    } else if det > tolerance && hessian.fxx < 0.0 {
        Classification::Maximum
    } else if det.abs() <= tolerance {
        Classification::Inconclusive
    } else {
        Classification::Saddle
    }
}

/// Searches the safe range chosen from `hints`.
pub fn find_critical_points<O: Oracle + ?Sized>(
    f: &O,
    hints: &ExpressionHints,
    settings: &CriticalPointSettings,
    cancel: &CancelToken,
) -> CalcResult<Vec<CriticalPoint>> {
    find_critical_points_in(f, pick_safe_range(hints), settings, cancel)
}

/// Searches `range × range`. Deterministic: the same oracle and range always
/// give the same points in the same order.
pub fn find_critical_points_in<O: Oracle + ?Sized>(
    f: &O,
    range: Range,
    settings: &CriticalPointSettings,
    cancel: &CancelToken,
) -> CalcResult<Vec<CriticalPoint>> {
    settings.validate()?;
    let grid = GridSpec::over(range, settings.seed_samples)?;

    let seeds = collect_seeds(f, &grid, settings, cancel)?;
    debug!("critical point search kept {} of {} seeds", seeds.len(), grid.count().pow(2));

    let mut unique: Vec<(f64, f64)> = Vec::new();
    for seed in seeds {
        let refined = refine(f, seed, &settings.newton, settings.step);
        if unique
            .iter()
            .any(|&known| distance(known, refined) < settings.dedup_distance)
        {
            continue;
        }
        unique.push(refined);
    }

    Ok(unique
        .into_iter()
        .map(|(x, y)| {
            let hessian = hessian(f, x, y, settings.step);
            CriticalPoint {
                x,
                y,
                f: sample(f, x, y),
                classification: classify(&hessian, settings.classification_tolerance),
                determinant: hessian.determinant(),
                hessian,
            }
        })
        .collect())
}

fn collect_seeds<O: Oracle + ?Sized>(
    f: &O,
    grid: &GridSpec,
    settings: &CriticalPointSettings,
    cancel: &CancelToken,
) -> CalcResult<Vec<(f64, f64)>> {
    let mut seeds = Vec::new();
    for x in grid.iter() {
        cancel.check()?;
        for y in grid.iter() {
            let g = gradient(f, x, y, settings.step);
            if g.is_finite() && g.norm() < settings.seed_gradient_tolerance {
                seeds.push((x, y));
            }
        }
    }
    Ok(seeds)
}

/// Newton iteration on ∇f = 0. A near-singular Hessian ends refinement at the
/// last point reached.
fn refine<O: Oracle + ?Sized>(
    f: &O,
    seed: (f64, f64),
    newton: &NewtonSettings,
    h: f64,
) -> (f64, f64) {
    let (mut x, mut y) = seed;
    for iteration in 0..newton.max_steps {
        let g = gradient(f, x, y, h);
        let hess = hessian(f, x, y, h);
        let Some(step) = hess.newton_step(&g, newton.singular_tolerance) else {
            debug!(
                "degenerate hessian at ({x}, {y}) after {iteration} newton steps (det = {})",
                hess.determinant()
            );
            break;
        };
        x -= step[0];
        y -= step[1];
        if step.norm() < newton.step_tolerance {
            break;
        }
    }
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::{classify, find_critical_points, find_critical_points_in, Classification};
    use crate::cancel::CancelToken;
    use crate::derivatives::Hessian;
    use crate::error::CalcError;
    use crate::grid::Range;
    use crate::range::ExpressionHints;
    use crate::settings::CriticalPointSettings;
    use approx::assert_abs_diff_eq;

    fn search(f: impl Fn(f64, f64) -> f64) -> Vec<super::CriticalPoint> {
        find_critical_points(
            &f,
            &ExpressionHints::none(),
            &CriticalPointSettings::default(),
            &CancelToken::new(),
        )
        .expect("search should run")
    }

    #[test]
    fn paraboloid_has_single_minimum() {
        let points = search(|x, y| x * x + y * y);
        assert_eq!(points.len(), 1, "unexpected points: {points:?}");
        let p = points[0];
        assert_eq!(p.classification, Classification::Minimum);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(p.f, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn hyperbolic_paraboloid_is_saddle() {
        let points = search(|x, y| x * x - y * y);
        assert_eq!(points.len(), 1, "unexpected points: {points:?}");
        assert_eq!(points[0].classification, Classification::Saddle);
        assert!(points[0].determinant < 0.0);
    }

    #[test]
    fn newton_refines_off_grid_maximum() {
        // Maximum at (0.3, -0.7), between grid nodes; the four surrounding
        // seeds pass only with a loose seed tolerance.
        let settings = CriticalPointSettings {
            seed_gradient_tolerance: 1.0,
            ..CriticalPointSettings::default()
        };
        let f = |x: f64, y: f64| -(x - 0.3).powi(2) - (y + 0.7).powi(2);
        let points =
            find_critical_points_in(&f, Range::symmetric(5.0), &settings, &CancelToken::new())
                .expect("search should run");
        assert_eq!(points.len(), 1, "unexpected points: {points:?}");
        assert_eq!(points[0].classification, Classification::Maximum);
        assert_abs_diff_eq!(points[0].x, 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(points[0].y, -0.7, epsilon = 1e-6);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let f = |x: f64, y: f64| x.sin() * y.cos();
        let settings = CriticalPointSettings::default();
        let range = Range::symmetric(5.0);
        let first = find_critical_points_in(&f, range, &settings, &CancelToken::new())
            .expect("search should run");
        let second = find_critical_points_in(&f, range, &settings, &CancelToken::new())
            .expect("search should run");
        assert_eq!(first, second);
    }

    #[test]
    fn plane_has_no_critical_points() {
        assert!(search(|x, y| x + y).is_empty());
        assert!(search(|x, y| 3.0 * x - 0.5 * y + 7.0).is_empty());
    }

    #[test]
    fn flat_function_keeps_unrefined_points() {
        // Every seed has zero gradient and a singular Hessian; refinement
        // stops immediately and dedup leaves one point per seed.
        let points = search(|_, _| 1.0);
        assert_eq!(points.len(), 21 * 21);
        assert!(points
            .iter()
            .all(|p| p.classification == Classification::Inconclusive));
    }

    #[test]
    fn undefined_value_is_reported_as_nan() {
        // f is undefined at the origin only; the gradient there is still finite.
        let f = |x: f64, y: f64| {
            if x == 0.0 && y == 0.0 {
                f64::NAN
            } else {
                x * x + y * y
            }
        };
        let points = search(f);
        assert_eq!(points.len(), 1);
        assert!(points[0].f.is_nan());
        assert_eq!(points[0].classification, Classification::Inconclusive);
    }

    #[test]
    fn classification_bands() {
        let tol = 1e-6;
        let h = |fxx, fyy, fxy| Hessian { fxx, fyy, fxy };
        assert_eq!(classify(&h(2.0, 2.0, 0.0), tol), Classification::Minimum);
        assert_eq!(classify(&h(-2.0, -2.0, 0.0), tol), Classification::Maximum);
        assert_eq!(classify(&h(2.0, -2.0, 0.0), tol), Classification::Saddle);
        assert_eq!(classify(&h(1.0, 0.0, 0.0), tol), Classification::Inconclusive);
    }

    #[test]
    fn cancelled_search_stops() {
        let token = CancelToken::new();
        token.cancel();
        let result = find_critical_points(
            &|x: f64, y: f64| x * y,
            &ExpressionHints::none(),
            &CriticalPointSettings::default(),
            &token,
        );
        assert_eq!(result, Err(CalcError::Cancelled));
    }
}
