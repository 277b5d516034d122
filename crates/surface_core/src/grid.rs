use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// A closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> CalcResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// `[-half_width, half_width]`.
    pub fn symmetric(half_width: f64) -> Self {
        Self {
            min: -half_width,
            max: half_width,
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(CalcError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// `count` evenly spaced samples from `min` to `max`, both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSpec {
    min: f64,
    max: f64,
    count: usize,
}

impl GridSpec {
    pub fn new(min: f64, max: f64, count: usize) -> CalcResult<Self> {
        Range::new(min, max)?;
        if count < 2 {
            return Err(CalcError::InvalidResolution { count, required: 2 });
        }
        Ok(Self { min, max, count })
    }

    pub fn over(range: Range, count: usize) -> CalcResult<Self> {
        Self::new(range.min, range.max, count)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn range(&self) -> Range {
        Range {
            min: self.min,
            max: self.max,
        }
    }

    pub fn step(&self) -> f64 {
        (self.max - self.min) / (self.count - 1) as f64
    }

    /// The `index`-th sample. The last sample is exactly `max`.
    pub fn value(&self, index: usize) -> f64 {
        if index + 1 >= self.count {
            self.max
        } else {
            self.min + self.step() * index as f64
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| self.value(i))
    }

    pub fn values(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

pub(crate) fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

#[cfg(test)]
mod tests {
    use super::{GridSpec, Range};
    use crate::error::CalcError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn grid_includes_both_ends() {
        let grid = GridSpec::new(-5.0, 5.0, 21).expect("valid grid");
        let values = grid.values();
        assert_eq!(values.len(), 21);
        assert_eq!(values[0], -5.0);
        assert_eq!(values[20], 5.0);
        assert_abs_diff_eq!(values[10], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.step(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn grid_rejects_malformed_specs() {
        assert_eq!(
            GridSpec::new(1.0, 1.0, 10),
            Err(CalcError::InvalidRange { min: 1.0, max: 1.0 })
        );
        assert_eq!(
            GridSpec::new(0.0, 1.0, 1),
            Err(CalcError::InvalidResolution {
                count: 1,
                required: 2
            })
        );
        assert!(Range::new(f64::NAN, 1.0).is_err());
        assert!(Range::new(2.0, -2.0).is_err());
    }
}
