use crate::errors::CoreError;
use crate::models::aggregate::{Appreciation, Percentage};
use crate::models::holding::HoldingRecord;
use crate::models::loan::LoanRecord;
use crate::models::net_worth::NetWorthState;

/// Build the net worth view from the full asset and loan collections.
///
/// `total_asset_value = Σ current_value`, `total_loan_value = Σ outstanding_balance`,
/// `net_worth = total_asset_value − total_loan_value`.
pub fn recompute_net_worth(assets: Vec<HoldingRecord>, loans: Vec<LoanRecord>) -> NetWorthState {
    NetWorthState::new(assets, loans)
}

/// Cost vs. current value for one holding. `gain_percent` is undefined on a zero cost basis.
pub fn appreciation_of(asset: &HoldingRecord) -> Appreciation {
    let invested = asset.invested();
    let current = asset.current_value();
    let gain = current - invested;
    Appreciation {
        invested,
        current,
        gain,
        gain_percent: Percentage::ratio(gain, invested),
        is_positive: gain >= 0.0,
    }
}

/// Asset value net of the loan secured against it.
/// An asset with no (or a dangling) loan link is held outright.
pub fn equity_of(state: &NetWorthState, asset_id: &str) -> Result<f64, CoreError> {
    let asset = state
        .asset(asset_id)
        .ok_or_else(|| CoreError::RecordNotFound(asset_id.to_string()))?;
    let owed = state
        .loan_for_asset(asset_id)
        .map(|loan| loan.outstanding_balance)
        .unwrap_or(0.0);
    Ok(asset.current_value() - owed)
}
