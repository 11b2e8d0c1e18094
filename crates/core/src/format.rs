//! Display helpers for amounts and returns.
//!
//! Derivation never rounds; these functions are the only place values are
//! shortened for display.

use crate::models::aggregate::Percentage;

/// Rendering of an undefined percentage.
pub const UNDEFINED_PERCENT: &str = "—";

/// `+12.34%`, `-0.50%`, or `—` when the return is undefined.
pub fn format_percent(percent: Percentage) -> String {
    match percent {
        Percentage::Defined(value) => {
            // -0.0 and tiny negatives that round to zero print as +0.00%
            let value = if value.abs() < 0.005 { 0.0 } else { value };
            let sign = if value >= 0.0 { "+" } else { "" };
            format!("{sign}{value:.2}%")
        }
        Percentage::Undefined => UNDEFINED_PERCENT.to_string(),
    }
}

/// Chart-axis style rupee amount: `₹12.3L` from one lakh up, `₹45K` below.
pub fn format_inr_compact(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 100_000.0 {
        format!("{sign}₹{:.1}L", abs / 100_000.0)
    } else {
        format!("{sign}₹{:.0}K", abs / 1_000.0)
    }
}

/// Whole rupees with Indian digit grouping: `₹12,34,567`.
pub fn format_inr(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", value.abs());
    format!("{sign}₹{}", group_indian(&digits))
}

/// Last three digits, then groups of two: "1234567" → "12,34,567".
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
