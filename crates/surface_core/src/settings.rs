//! Named tunables for every algorithm in the crate.
//!
//! Each struct carries the documented defaults through `Default` and accepts
//! partial objects through `#[serde(default)]`, so a host only overrides what it
//! cares about.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Finite-difference step used when a caller does not pick one.
pub const DEFAULT_STEP: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    pub max_steps: usize,
    /// Refinement stops once the Newton step is shorter than this.
    pub step_tolerance: f64,
    /// Refinement of a point is abandoned when `|det H|` drops below this.
    pub singular_tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_steps: 6,
            step_tolerance: 1e-6,
            singular_tolerance: 1e-12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BisectionSettings {
    pub max_iterations: usize,
    /// Absolute tolerance on the bisected function's value.
    pub tolerance: f64,
}

impl BisectionSettings {
    pub const fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    fn validate(&self, name: &str) -> CalcResult<()> {
        require(self.max_iterations > 0, || {
            format!("{name}.max_iterations must be greater than zero")
        })?;
        require_positive(self.tolerance, &format!("{name}.tolerance"))
    }
}

impl Default for BisectionSettings {
    fn default() -> Self {
        Self::new(24, 1e-8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalPointSettings {
    /// Seeds per axis of the uniform seed grid.
    pub seed_samples: usize,
    /// Seeds are kept when `‖∇f‖` is below this.
    pub seed_gradient_tolerance: f64,
    pub newton: NewtonSettings,
    /// Refined points closer than this are the same point.
    pub dedup_distance: f64,
    /// Band around zero where the Hessian determinant is inconclusive.
    pub classification_tolerance: f64,
    pub step: f64,
}

impl Default for CriticalPointSettings {
    fn default() -> Self {
        Self {
            seed_samples: 21,
            seed_gradient_tolerance: 1e-2,
            newton: NewtonSettings::default(),
            dedup_distance: 1e-2,
            classification_tolerance: 1e-6,
            step: DEFAULT_STEP,
        }
    }
}

impl CriticalPointSettings {
    pub fn validate(&self) -> CalcResult<()> {
        require_samples(self.seed_samples)?;
        require_positive(self.seed_gradient_tolerance, "seed_gradient_tolerance")?;
        require(self.newton.max_steps > 0, || {
            "newton.max_steps must be greater than zero".to_string()
        })?;
        require_positive(self.newton.step_tolerance, "newton.step_tolerance")?;
        require_positive(self.newton.singular_tolerance, "newton.singular_tolerance")?;
        require_positive(self.dedup_distance, "dedup_distance")?;
        require_non_negative(self.classification_tolerance, "classification_tolerance")?;
        require_positive(self.step, "step")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagrangeSettings {
    /// Samples per axis of the curve-tracing mesh.
    pub mesh_samples: usize,
    /// Mesh samples with `|g|` inside this band count as lying on the curve.
    pub zero_band: f64,
    pub curve_bisection: BisectionSettings,
    pub parallel_bisection: BisectionSettings,
    /// Longest chord joined in the parallelism search, in mesh-cell diagonals.
    pub chord_factor: f64,
    /// Gauss-Newton steps pulling a located candidate back onto `g = 0`.
    pub projection_steps: usize,
    pub dedup_distance: f64,
    /// Tie tolerance used when labeling candidates.
    pub label_tolerance: f64,
    pub step: f64,
}

impl Default for LagrangeSettings {
    fn default() -> Self {
        Self {
            mesh_samples: 60,
            zero_band: 1e-6,
            curve_bisection: BisectionSettings::new(22, 1e-10),
            parallel_bisection: BisectionSettings::new(24, 1e-8),
            chord_factor: 1.0,
            projection_steps: 3,
            dedup_distance: 1e-3,
            label_tolerance: 1e-8,
            step: DEFAULT_STEP,
        }
    }
}

impl LagrangeSettings {
    pub fn validate(&self) -> CalcResult<()> {
        require_samples(self.mesh_samples)?;
        require_non_negative(self.zero_band, "zero_band")?;
        self.curve_bisection.validate("curve_bisection")?;
        self.parallel_bisection.validate("parallel_bisection")?;
        require_positive(self.chord_factor, "chord_factor")?;
        require_positive(self.dedup_distance, "dedup_distance")?;
        require_non_negative(self.label_tolerance, "label_tolerance")?;
        require_positive(self.step, "step")
    }
}

/// Resolution of the display-oriented constraint curve sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceCurveSettings {
    pub x_samples: usize,
    pub y_samples: usize,
    pub zero_band: f64,
    pub bisection: BisectionSettings,
}

impl Default for SurfaceCurveSettings {
    fn default() -> Self {
        Self {
            x_samples: 41,
            y_samples: 81,
            zero_band: 1e-6,
            bisection: BisectionSettings::new(24, 1e-10),
        }
    }
}

impl SurfaceCurveSettings {
    pub fn validate(&self) -> CalcResult<()> {
        require_samples(self.x_samples)?;
        require_samples(self.y_samples)?;
        require_non_negative(self.zero_band, "zero_band")?;
        self.bisection.validate("bisection")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegralSettings {
    pub nx: usize,
    pub ny: usize,
}

impl Default for IntegralSettings {
    fn default() -> Self {
        Self { nx: 60, ny: 60 }
    }
}

/// Grid used by the domain mask and the value-range estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    pub half_width: f64,
    pub mask_samples: usize,
    pub value_range_samples: usize,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            half_width: 10.0,
            mask_samples: 121,
            value_range_samples: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Distance of the first probe from the target point.
    pub initial_offset: f64,
    /// Factor applied to the offset between successive probes.
    pub shrink: f64,
    pub probes: usize,
    /// Relative agreement required between approach paths.
    pub tolerance: f64,
    /// Magnitude beyond which every path is considered divergent.
    pub divergence_threshold: f64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            initial_offset: 1e-1,
            shrink: 0.1,
            probes: 5,
            tolerance: 1e-3,
            divergence_threshold: 1e8,
        }
    }
}

impl LimitSettings {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive(self.initial_offset, "initial_offset")?;
        require(self.shrink > 0.0 && self.shrink < 1.0, || {
            "shrink must lie strictly between 0 and 1".to_string()
        })?;
        require(self.probes > 0, || "probes must be greater than zero".to_string())?;
        require_positive(self.tolerance, "tolerance")?;
        require_positive(self.divergence_threshold, "divergence_threshold")
    }
}

/// Bundle of every tunable, as handed over by a host in one object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub critical: CriticalPointSettings,
    pub lagrange: LagrangeSettings,
    pub surface_curve: SurfaceCurveSettings,
    pub integral: IntegralSettings,
    pub sampling: SamplingSettings,
    pub limit: LimitSettings,
}

impl AnalysisSettings {
    pub fn validate(&self) -> CalcResult<()> {
        self.critical.validate()?;
        self.lagrange.validate()?;
        self.surface_curve.validate()?;
        require(self.integral.nx > 0 && self.integral.ny > 0, || {
            "integral resolution must be positive".to_string()
        })?;
        require_positive(self.sampling.half_width, "sampling.half_width")?;
        require_samples(self.sampling.mask_samples)?;
        require_samples(self.sampling.value_range_samples)?;
        self.limit.validate()
    }
}

fn require(condition: bool, message: impl FnOnce() -> String) -> CalcResult<()> {
    if condition {
        Ok(())
    } else {
        Err(CalcError::InvalidSettings(message()))
    }
}

fn require_positive(value: f64, name: &str) -> CalcResult<()> {
    require(value.is_finite() && value > 0.0, || {
        format!("{name} must be positive, got {value}")
    })
}

fn require_non_negative(value: f64, name: &str) -> CalcResult<()> {
    require(value.is_finite() && value >= 0.0, || {
        format!("{name} must be non-negative, got {value}")
    })
}

fn require_samples(count: usize) -> CalcResult<()> {
    if count < 2 {
        return Err(CalcError::InvalidResolution { count, required: 2 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{AnalysisSettings, CriticalPointSettings, LagrangeSettings};
    use crate::error::CalcError;

    #[test]
    fn defaults_match_documented_constants() {
        let critical = CriticalPointSettings::default();
        assert_eq!(critical.seed_samples, 21);
        assert_eq!(critical.newton.max_steps, 6);
        assert_eq!(critical.newton.singular_tolerance, 1e-12);
        assert_eq!(critical.step, 1e-4);

        let lagrange = LagrangeSettings::default();
        assert_eq!(lagrange.curve_bisection.max_iterations, 22);
        assert_eq!(lagrange.curve_bisection.tolerance, 1e-10);
        assert_eq!(lagrange.parallel_bisection.max_iterations, 24);
        assert_eq!(lagrange.parallel_bisection.tolerance, 1e-8);
        assert_eq!(lagrange.dedup_distance, 1e-3);

        assert!(AnalysisSettings::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let mut settings = AnalysisSettings::default();
        settings.critical.step = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(CalcError::InvalidSettings(message)) if message.contains("step")
        ));

        let mut settings = AnalysisSettings::default();
        settings.lagrange.mesh_samples = 1;
        assert_eq!(
            settings.validate(),
            Err(CalcError::InvalidResolution {
                count: 1,
                required: 2
            })
        );

        let mut settings = AnalysisSettings::default();
        settings.limit.shrink = 1.5;
        assert!(settings.validate().is_err());
    }
}
