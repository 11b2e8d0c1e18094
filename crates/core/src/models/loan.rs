use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::Percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    Home,
    Car,
    Personal,
    Education,
    Other,
}

impl std::fmt::Display for LoanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanType::Home => write!(f, "Home"),
            LoanType::Car => write!(f, "Car"),
            LoanType::Personal => write!(f, "Personal"),
            LoanType::Education => write!(f, "Education"),
            LoanType::Other => write!(f, "Other"),
        }
    }
}

/// A liability, optionally secured against one of the holdings.
///
/// `linked_asset_id` is a lookup key only. It may point at a holding that
/// no longer exists; callers treat that as "no linked asset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: String,
    pub loan_type: LoanType,
    pub linked_asset_id: String,
    /// Original sanctioned amount
    pub loan_amount: f64,
    pub outstanding_balance: f64,
    pub monthly_emi: f64,
    /// Annual rate
    pub interest_rate_percent: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LoanRecord {
    /// Amount of principal already paid back.
    pub fn principal_repaid(&self) -> f64 {
        self.loan_amount - self.outstanding_balance
    }

    /// Share of the original amount repaid, in percent.
    pub fn repaid_percent(&self) -> Percentage {
        Percentage::ratio(self.principal_repaid(), self.loan_amount)
    }
}
