//! Grid screening: where f is defined, what values it takes, and how it
//! behaves next to a point.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::CalcResult;
use crate::grid::GridSpec;
use crate::settings::LimitSettings;
use crate::traits::{sample, Oracle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    InDomain,
    OutOfDomain,
}

/// `cells[j][i]` describes the point `(xs[i], ys[j])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMask {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub cells: Vec<Vec<Membership>>,
}

impl DomainMask {
    pub fn in_domain_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == Membership::InDomain)
            .count()
    }

    pub fn fraction_in_domain(&self) -> f64 {
        let total = self.xs.len() * self.ys.len();
        if total == 0 {
            return 0.0;
        }
        self.in_domain_count() as f64 / total as f64
    }
}

pub fn domain_mask<O: Oracle + ?Sized>(
    f: &O,
    xs: &GridSpec,
    ys: &GridSpec,
    cancel: &CancelToken,
) -> CalcResult<DomainMask> {
    let x_values = xs.values();
    let mut cells = Vec::with_capacity(ys.count());
    for y in ys.iter() {
        cancel.check()?;
        cells.push(
            x_values
                .iter()
                .map(|&x| {
                    if sample(f, x, y).is_finite() {
                        Membership::InDomain
                    } else {
                        Membership::OutOfDomain
                    }
                })
                .collect(),
        );
    }
    Ok(DomainMask {
        xs: x_values,
        ys: ys.values(),
        cells,
    })
}

/// Smallest and largest finite value of f seen on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub finite_samples: usize,
}

/// Returns `None` when f is undefined at every grid point.
pub fn estimate_value_range<O: Oracle + ?Sized>(
    f: &O,
    xs: &GridSpec,
    ys: &GridSpec,
    cancel: &CancelToken,
) -> CalcResult<Option<ValueRange>> {
    let mut range: Option<ValueRange> = None;
    for y in ys.iter() {
        cancel.check()?;
        for x in xs.iter() {
            let value = sample(f, x, y);
            if !value.is_finite() {
                continue;
            }
            range = Some(match range {
                None => ValueRange {
                    min: value,
                    max: value,
                    finite_samples: 1,
                },
                Some(r) => ValueRange {
                    min: r.min.min(value),
                    max: r.max.max(value),
                    finite_samples: r.finite_samples + 1,
                },
            });
        }
    }
    Ok(range)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LimitEstimate {
    Converges(f64),
    /// Every path blows up with this sign (`1.0` or `-1.0`).
    Diverges(f64),
    Undefined,
}

const APPROACH_DIRECTIONS: [(f64, f64); 6] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
];

/// Numerical probe of `lim f(x, y)` as `(x, y) → (x0, y0)`.
///
/// f is sampled along six straight approach paths at `probes` offsets,
/// starting at `initial_offset` and multiplied by `shrink` each time. The
/// closest probe decides: every path past `divergence_threshold` with one sign,
/// and no path shrinking in magnitude over the sequence, diverges; paths
/// agreeing within `tolerance·(1 + |v|)` whose mean has also settled since the
/// previous probe converge. Anything else is undefined. Path-dependent limits
/// along curved approaches are not detected.
pub fn probe_limit<O: Oracle + ?Sized>(
    f: &O,
    x0: f64,
    y0: f64,
    settings: &LimitSettings,
) -> CalcResult<LimitEstimate> {
    settings.validate()?;
    // probes[k][d]: direction d at the k-th offset.
    let mut probes: Vec<[f64; 6]> = Vec::with_capacity(settings.probes);
    let mut offset = settings.initial_offset;
    for _ in 0..settings.probes {
        let mut values = [f64::NAN; 6];
        for (value, &(dx, dy)) in values.iter_mut().zip(APPROACH_DIRECTIONS.iter()) {
            *value = sample(f, x0 + offset * dx, y0 + offset * dy);
        }
        probes.push(values);
        offset *= settings.shrink;
    }

    let Some(last) = probes.last() else {
        return Ok(LimitEstimate::Undefined);
    };
    if last.iter().any(|v| !v.is_finite()) {
        return Ok(LimitEstimate::Undefined);
    }

    let threshold = settings.divergence_threshold;
    let growing = (0..APPROACH_DIRECTIONS.len()).all(|d| {
        probes
            .windows(2)
            .all(|w| !w[0][d].is_finite() || w[1][d].abs() >= w[0][d].abs())
    });
    if growing && last.iter().all(|&v| v > threshold) {
        return Ok(LimitEstimate::Diverges(1.0));
    }
    if growing && last.iter().all(|&v| v < -threshold) {
        return Ok(LimitEstimate::Diverges(-1.0));
    }

    let mean = path_mean(last);
    let band = settings.tolerance * (1.0 + mean.abs());
    let spread = last.iter().fold(0.0f64, |acc, &v| acc.max((v - mean).abs()));
    let settled = match probes.len().checked_sub(2).map(|k| &probes[k]) {
        Some(previous) => (path_mean(previous) - mean).abs() <= band,
        None => true,
    };
    if spread <= band && settled {
        Ok(LimitEstimate::Converges(mean))
    } else {
        Ok(LimitEstimate::Undefined)
    }
}

fn path_mean(values: &[f64; 6]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
