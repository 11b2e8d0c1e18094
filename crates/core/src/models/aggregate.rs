use serde::{Deserialize, Serialize};

/// A percentage that may be undefined because its denominator was zero.
///
/// Returns on a zero cost basis are `Undefined`, never `0%`. Presentation
/// decides how to render the undefined case (see [`crate::format::format_percent`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Percentage {
    Defined(f64),
    Undefined,
}

impl Percentage {
    /// `numerator / denominator × 100`, or `Undefined` when the denominator is zero
    /// or the result is not finite.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Percentage::Undefined;
        }
        // Multiply first: 18500 * 100 / 50000 is exact, 18500 / 50000 * 100 is not.
        let value = (numerator * 100.0) / denominator;
        if value.is_finite() {
            Percentage::Defined(value)
        } else {
            Percentage::Undefined
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Percentage::Defined(v) => Some(*v),
            Percentage::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Percentage::Undefined)
    }
}

/// Roll-up of a set of holdings. Always recomputed from the records, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAggregate {
    /// Σ quantity × unit_cost_basis
    pub total_invested: f64,

    /// Σ current_value
    pub total_current_value: f64,

    /// total_current_value − total_invested
    pub total_gain: f64,

    /// total_gain / total_invested × 100
    pub total_return_percent: Percentage,

    /// Breakdown by asset class, in order of first occurrence
    pub categories: Vec<CategoryBreakdown>,
}

impl PortfolioAggregate {
    pub fn category(&self, key: &str) -> Option<&CategoryBreakdown> {
        self.categories.iter().find(|c| c.key == key)
    }
}

/// Subtotal for one group of holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// Group key (asset class, metal type, bank name, ...)
    pub key: String,

    /// Number of holdings in the group
    pub count: usize,

    pub invested: f64,

    pub current_value: f64,

    pub gain: f64,

    pub return_percent: Percentage,

    /// current_value / snapshot total current value, as a fraction.
    /// `None` when the snapshot total is zero.
    pub weight: Option<f64>,
}

/// Cost vs. current value for a single holding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appreciation {
    pub invested: f64,
    pub current: f64,
    pub gain: f64,
    pub gain_percent: Percentage,
    pub is_positive: bool,
}
