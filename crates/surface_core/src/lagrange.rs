//! Constrained extrema of f on the implicit curve `g(x, y) = 0`.
//!
//! The curve is traced by bisecting sign changes of g along the rows and
//! columns of a mesh, then the Lagrange condition is located as a zero of the
//! gradient cross product `C = fx·gy − fy·gx`, which eliminates the multiplier.
//!
//! Recall is bounded by the mesh: curve features finer than one cell, and
//! components that no mesh line crosses with a sign change, produce no
//! candidates.

use std::cmp::Ordering;
use std::f64::consts::SQRT_2;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bisection::{bisect_segment, Point};
use crate::cancel::CancelToken;
use crate::derivatives::gradient;
use crate::error::CalcResult;
use crate::grid::{distance, GridSpec, Range};
use crate::range::{pick_safe_range, ExpressionHints};
use crate::settings::{LagrangeSettings, SurfaceCurveSettings};
use crate::traits::{sample, Oracle};

/// A traced point on `g = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// A point of the curve lifted onto the surface `z = f(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCurvePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A point on `g = 0` where the gradients of f and g are parallel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCandidate {
    pub x: f64,
    pub y: f64,
    pub f: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateLabel {
    Maximum,
    Minimum,
    Candidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledCandidate {
    #[serde(flatten)]
    pub candidate: ConstraintCandidate,
    pub label: CandidateLabel,
}

/// Traces `g = 0` over `range × range`, sorted by `(x, y)`.
pub fn trace_constraint_curve<G: Oracle + ?Sized>(
    g: &G,
    range: Range,
    settings: &LagrangeSettings,
    cancel: &CancelToken,
) -> CalcResult<Vec<CurvePoint>> {
    settings.validate()?;
    let grid = GridSpec::over(range, settings.mesh_samples)?;
    let n = grid.count();
    let axis = grid.values();

    // values[ix * n + iy] = g(axis[ix], axis[iy])
    let mut values = Vec::with_capacity(n * n);
    for &x in &axis {
        cancel.check()?;
        values.extend(axis.iter().map(|&y| sample(g, x, y)));
    }
    let value = |ix: usize, iy: usize| values[ix * n + iy];

    let mut points = Vec::new();
    let mut refine = |a: Point, b: Point, fa: f64, fb: f64| {
        if let Some((x, y)) = bisect_segment(
            a,
            b,
            fa,
            fb,
            settings.zero_band,
            &settings.curve_bisection,
            |x, y| sample(g, x, y),
        ) {
            points.push(CurvePoint { x, y });
        }
    };

    for ix in 0..n {
        cancel.check()?;
        let x = axis[ix];
        for iy in 0..n - 1 {
            refine(
                (x, axis[iy]),
                (x, axis[iy + 1]),
                value(ix, iy),
                value(ix, iy + 1),
            );
        }
    }
    for iy in 0..n {
        cancel.check()?;
        let y = axis[iy];
        for ix in 0..n - 1 {
            refine(
                (axis[ix], y),
                (axis[ix + 1], y),
                value(ix, iy),
                value(ix + 1, iy),
            );
        }
    }

    points.sort_by(compare_points);
    // Mesh nodes inside the zero band are reported by every segment touching them.
    points.dedup();
    debug!("traced {} points on the constraint curve", points.len());
    Ok(points)
}

/// Candidates for extremizing f subject to `g = 0`, searched over the safe
/// range chosen from the hints for f.
pub fn solve_lagrange<F, G>(
    f: &F,
    g: &G,
    hints: &ExpressionHints,
    settings: &LagrangeSettings,
    cancel: &CancelToken,
) -> CalcResult<Vec<ConstraintCandidate>>
where
    F: Oracle + ?Sized,
    G: Oracle + ?Sized,
{
    solve_lagrange_in(f, g, pick_safe_range(hints), settings, cancel)
}

/// Candidates over an explicit `range × range`.
///
/// Curve points are walked in sort order. Each point is paired with the
/// following points whose chord is at most `chord_factor` mesh-cell diagonals
/// long, so neighbours on the same branch are joined while jumps between
/// branches are not. A sign change (or near-zero value) of C on a chord is
/// bisected, the zero is pulled back onto `g = 0`, and f is evaluated there.
/// Candidates where f is undefined are dropped.
pub fn solve_lagrange_in<F, G>(
    f: &F,
    g: &G,
    range: Range,
    settings: &LagrangeSettings,
    cancel: &CancelToken,
) -> CalcResult<Vec<ConstraintCandidate>>
where
    F: Oracle + ?Sized,
    G: Oracle + ?Sized,
{
    let curve = trace_constraint_curve(g, range, settings, cancel)?;
    if curve.len() < 2 {
        return Ok(Vec::new());
    }

    let h = settings.step;
    let cross = |x: f64, y: f64| gradient(f, x, y, h).cross(&gradient(g, x, y, h));
    let spacing = range.width() / (settings.mesh_samples - 1) as f64;
    let max_chord = settings.chord_factor * spacing * SQRT_2;
    let cross_values: Vec<f64> = curve.iter().map(|p| cross(p.x, p.y)).collect();
    let tolerance = settings.parallel_bisection.tolerance;

    let mut candidates: Vec<ConstraintCandidate> = Vec::new();
    for i in 0..curve.len() {
        cancel.check()?;
        let a = (curve[i].x, curve[i].y);
        for j in i + 1..curve.len() {
            let b = (curve[j].x, curve[j].y);
            if b.0 - a.0 > max_chord {
                break;
            }
            if distance(a, b) > max_chord {
                continue;
            }
            let Some(zero) = bisect_segment(
                a,
                b,
                cross_values[i],
                cross_values[j],
                tolerance,
                &settings.parallel_bisection,
                cross,
            ) else {
                continue;
            };
            let (x, y) = project_onto_curve(g, zero, settings);
            let value = sample(f, x, y);
            if !value.is_finite() {
                continue;
            }
            if candidates
                .iter()
                .any(|c| distance((c.x, c.y), (x, y)) < settings.dedup_distance)
            {
                continue;
            }
            candidates.push(ConstraintCandidate { x, y, f: value });
        }
    }
    debug!(
        "lagrange search found {} candidates on {} curve points",
        candidates.len(),
        curve.len()
    );
    Ok(candidates)
}

/// Gauss-Newton steps `p ← p − g(p)·∇g / ‖∇g‖²` toward the curve.
fn project_onto_curve<G: Oracle + ?Sized>(
    g: &G,
    start: Point,
    settings: &LagrangeSettings,
) -> Point {
    let (mut x, mut y) = start;
    for _ in 0..settings.projection_steps {
        let value = sample(g, x, y);
        if !value.is_finite() || value.abs() < settings.curve_bisection.tolerance {
            break;
        }
        let grad = gradient(g, x, y, settings.step);
        let norm_sq = grad.fx * grad.fx + grad.fy * grad.fy;
        if !norm_sq.is_finite() || norm_sq <= f64::EPSILON {
            break;
        }
        let (nx, ny) = (x - value * grad.fx / norm_sq, y - value * grad.fy / norm_sq);
        if !sample(g, nx, ny).is_finite() {
            break;
        }
        x = nx;
        y = ny;
    }
    (x, y)
}

/// Relative labels over the discovered set only.
///
/// Every candidate within `tolerance` of the largest f is a `Maximum`, every
/// one within `tolerance` of the smallest is a `Minimum`. When the whole set is
/// flat (including a single candidate) nothing can be ranked and all are
/// `Candidate`; so are candidates with undefined f.
pub fn label_candidates(
    candidates: &[ConstraintCandidate],
    tolerance: f64,
) -> Vec<LabeledCandidate> {
    let finite = candidates.iter().map(|c| c.f).filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let rankable = max.is_finite() && min.is_finite() && max - min > tolerance;

    candidates
        .iter()
        .map(|&candidate| {
            let label = if !rankable || !candidate.f.is_finite() {
                CandidateLabel::Candidate
            } else if (candidate.f - max).abs() <= tolerance {
                CandidateLabel::Maximum
            } else if (candidate.f - min).abs() <= tolerance {
                CandidateLabel::Minimum
            } else {
                CandidateLabel::Candidate
            };
            LabeledCandidate { candidate, label }
        })
        .collect()
}

/// Samples `g = 0` column by column and lifts each point onto `z = f(x, y)`,
/// in scan order. Points where f is undefined are skipped.
pub fn sample_constraint_surface<F, G>(
    f: &F,
    g: &G,
    range: Range,
    settings: &SurfaceCurveSettings,
    cancel: &CancelToken,
) -> CalcResult<Vec<SurfaceCurvePoint>>
where
    F: Oracle + ?Sized,
    G: Oracle + ?Sized,
{
    settings.validate()?;
    let xs = GridSpec::over(range, settings.x_samples)?;
    let ys = GridSpec::over(range, settings.y_samples)?.values();

    let mut points = Vec::new();
    let mut push = |x: f64, y: f64| {
        let z = sample(f, x, y);
        if z.is_finite() {
            points.push(SurfaceCurvePoint { x, y, z });
        }
    };

    for x in xs.iter() {
        cancel.check()?;
        let column: Vec<f64> = ys.iter().map(|&y| sample(g, x, y)).collect();
        for iy in 0..ys.len() - 1 {
            let (v1, v2) = (column[iy], column[iy + 1]);
            if !v1.is_finite() || !v2.is_finite() {
                continue;
            }
            if v1.abs() < settings.zero_band {
                push(x, ys[iy]);
                continue;
            }
            if (v1 < 0.0) != (v2 < 0.0) && v2 != 0.0 {
                if let Some((rx, ry)) = bisect_segment(
                    (x, ys[iy]),
                    (x, ys[iy + 1]),
                    v1,
                    v2,
                    0.0,
                    &settings.bisection,
                    |x, y| sample(g, x, y),
                ) {
                    push(rx, ry);
                }
            }
        }
    }
    Ok(points)
}

fn compare_points(a: &CurvePoint, b: &CurvePoint) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}
