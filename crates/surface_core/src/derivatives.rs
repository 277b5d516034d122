//! Central finite differences on an [`Oracle`].
//!
//! Nothing here fails: an undefined sample turns the affected component into
//! `NaN` and leaves the others intact.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::traits::{sample, Oracle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub fx: f64,
    pub fy: f64,
}

impl Gradient {
    pub fn norm(&self) -> f64 {
        self.fx.hypot(self.fy)
    }

    pub fn is_finite(&self) -> bool {
        self.fx.is_finite() && self.fy.is_finite()
    }

    /// 2D cross product `fx·other.fy − fy·other.fx`; zero when the gradients are parallel.
    pub fn cross(&self, other: &Gradient) -> f64 {
        self.fx * other.fy - self.fy * other.fx
    }
}

/// Symmetric matrix `[[fxx, fxy], [fxy, fyy]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hessian {
    pub fxx: f64,
    pub fyy: f64,
    pub fxy: f64,
}

impl Hessian {
    pub fn determinant(&self) -> f64 {
        self.fxx * self.fyy - self.fxy * self.fxy
    }

    pub fn to_matrix(&self) -> Matrix2<f64> {
        Matrix2::new(self.fxx, self.fxy, self.fxy, self.fyy)
    }

    /// Newton step `H⁻¹·∇f`.
    ///
    /// Returns `None` when `|det H| < singular_tolerance` or when anything
    /// involved is undefined.
    pub fn newton_step(&self, gradient: &Gradient, singular_tolerance: f64) -> Option<Vector2<f64>> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < singular_tolerance || !gradient.is_finite() {
            return None;
        }
        let inverse = self.to_matrix().try_inverse()?;
        let step = inverse * Vector2::new(gradient.fx, gradient.fy);
        if step.iter().all(|v| v.is_finite()) {
            Some(step)
        } else {
            None
        }
    }
}

/// Value, gradient and Hessian of f at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointAnalysis {
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub gradient: Gradient,
    pub hessian: Hessian,
}

pub fn gradient<O: Oracle + ?Sized>(f: &O, x: f64, y: f64, h: f64) -> Gradient {
    let fx = (sample(f, x + h, y) - sample(f, x - h, y)) / (2.0 * h);
    let fy = (sample(f, x, y + h) - sample(f, x, y - h)) / (2.0 * h);
    Gradient { fx, fy }
}

pub fn hessian<O: Oracle + ?Sized>(f: &O, x: f64, y: f64, h: f64) -> Hessian {
    let center = sample(f, x, y);
    let h2 = h * h;
    let fxx = (sample(f, x + h, y) - 2.0 * center + sample(f, x - h, y)) / h2;
    let fyy = (sample(f, x, y + h) - 2.0 * center + sample(f, x, y - h)) / h2;
    let fxy = (sample(f, x + h, y + h) - sample(f, x + h, y - h) - sample(f, x - h, y + h)
        + sample(f, x - h, y - h))
        / (4.0 * h2);
    Hessian { fxx, fyy, fxy }
}

pub fn analyze_point<O: Oracle + ?Sized>(f: &O, x: f64, y: f64, h: f64) -> PointAnalysis {
    PointAnalysis {
        x,
        y,
        value: sample(f, x, y),
        gradient: gradient(f, x, y, h),
        hessian: hessian(f, x, y, h),
    }
}
