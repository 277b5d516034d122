//! Sampling-range heuristic driven by coarse expression hints.
//!
//! This is a guard against sampling next to asymptotes and domain edges, not a
//! domain computation: the returned interval may still contain undefined
//! points, and parts of the true domain may lie outside it.

use serde::{Deserialize, Serialize};

use crate::grid::Range;

/// Half-width used when no domain-sensitive operator is present.
pub const DEFAULT_HALF_WIDTH: f64 = 5.0;

/// Domain-sensitive operators an expression front end may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainOperator {
    /// `tan` and its relatives; poles repeat every π.
    Tangent,
    Logarithm,
    SquareRoot,
}

impl DomainOperator {
    /// Largest half-width considered safe when this operator appears.
    pub fn half_width_cap(self) -> f64 {
        match self {
            DomainOperator::Tangent => 1.2,
            DomainOperator::Logarithm => 5.0,
            DomainOperator::SquareRoot => 4.0,
        }
    }
}

/// Which domain-sensitive operators occur in the analyzed expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionHints {
    operators: Vec<DomainOperator>,
}

impl ExpressionHints {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, operator: DomainOperator) -> Self {
        self.insert(operator);
        self
    }

    pub fn insert(&mut self, operator: DomainOperator) {
        if !self.operators.contains(&operator) {
            self.operators.push(operator);
        }
    }

    pub fn operators(&self) -> &[DomainOperator] {
        &self.operators
    }
}

impl FromIterator<DomainOperator> for ExpressionHints {
    fn from_iter<I: IntoIterator<Item = DomainOperator>>(iter: I) -> Self {
        let mut hints = Self::default();
        for operator in iter {
            hints.insert(operator);
        }
        hints
    }
}

/// Symmetric sampling interval; the tightest applicable cap wins.
pub fn pick_safe_range(hints: &ExpressionHints) -> Range {
    let half_width = hints
        .operators()
        .iter()
        .map(|op| op.half_width_cap())
        .fold(DEFAULT_HALF_WIDTH, f64::min);
    Range::symmetric(half_width)
}

#[cfg(test)]
mod tests {
    use super::{pick_safe_range, DomainOperator, ExpressionHints};

    #[test]
    fn no_hints_gives_default_range() {
        let range = pick_safe_range(&ExpressionHints::none());
        assert_eq!(range.min, -5.0);
        assert_eq!(range.max, 5.0);
    }

    #[test]
    fn tangent_caps_range() {
        let hints = ExpressionHints::none().with(DomainOperator::Tangent);
        let range = pick_safe_range(&hints);
        assert!(range.max <= 1.2);
        assert_eq!(range.min, -range.max);
    }

    #[test]
    fn tightest_cap_wins() {
        let hints: ExpressionHints = [DomainOperator::Logarithm, DomainOperator::SquareRoot]
            .into_iter()
            .collect();
        assert_eq!(pick_safe_range(&hints).max, 4.0);

        let hints = hints.with(DomainOperator::Tangent);
        assert_eq!(pick_safe_range(&hints).max, 1.2);
        assert_eq!(pick_safe_range(&ExpressionHints::none().with(DomainOperator::Logarithm)).max, 5.0);
    }
}
