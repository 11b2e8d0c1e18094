use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::aggregate::Percentage;
use super::holding::MetalType;

/// How soon a dated event (e.g. a maturity) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyTier {
    /// 30 days or fewer (includes already due)
    ImminentHigh,
    /// 31 to 90 days
    ImminentMedium,
    /// More than 90 days
    Normal,
}

/// An active deposit approaching maturity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMaturity {
    pub holding_id: String,
    pub bank_name: String,
    pub maturity_date: NaiveDate,
    pub maturity_amount: f64,
    pub days_remaining: i64,
    pub urgency: UrgencyTier,
    /// `days_remaining <= 0`
    pub matured: bool,
}

/// Headline numbers for the fixed deposits page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositSummary {
    pub total_invested: f64,
    pub total_maturity_value: f64,
    pub total_interest_earned: f64,
    pub total_interest_accrued: f64,
    pub active_deposits: usize,
    pub matured_deposits: usize,
    /// Simple mean of the deposit rates; `None` with no deposits
    pub average_interest_rate: Option<f64>,
    /// Active deposits maturing within 90 days
    pub upcoming_maturities: usize,
    /// Active deposits maturing in the current calendar month
    pub this_month_maturities: usize,
}

/// Headline numbers for the precious metals page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalSummary {
    pub total_invested: f64,
    pub current_value: f64,
    pub total_profit_loss: f64,
    pub overall_return: Percentage,
    /// Grams held per metal
    pub total_weight_by_metal: HashMap<MetalType, f64>,
    pub total_items: usize,
}
