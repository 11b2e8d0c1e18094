use serde::{Deserialize, Serialize};

use super::holding::HoldingRecord;
use super::loan::LoanRecord;

/// Assets, liabilities and the totals derived from them.
///
/// Totals are private and recomputed from the full collections after every
/// mutation; there is no incremental patch path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NetWorthParts")]
pub struct NetWorthState {
    assets: Vec<HoldingRecord>,
    loans: Vec<LoanRecord>,
    total_asset_value: f64,
    total_loan_value: f64,
    net_worth: f64,
}

#[derive(Deserialize)]
struct NetWorthParts {
    #[serde(default)]
    assets: Vec<HoldingRecord>,
    #[serde(default)]
    loans: Vec<LoanRecord>,
}

impl From<NetWorthParts> for NetWorthState {
    fn from(parts: NetWorthParts) -> Self {
        Self::new(parts.assets, parts.loans)
    }
}

impl Default for NetWorthState {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl NetWorthState {
    pub fn new(assets: Vec<HoldingRecord>, loans: Vec<LoanRecord>) -> Self {
        let mut state = Self {
            assets,
            loans,
            total_asset_value: 0.0,
            total_loan_value: 0.0,
            net_worth: 0.0,
        };
        state.recompute();
        state
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn assets(&self) -> &[HoldingRecord] {
        &self.assets
    }

    pub fn loans(&self) -> &[LoanRecord] {
        &self.loans
    }

    pub fn total_asset_value(&self) -> f64 {
        self.total_asset_value
    }

    pub fn total_loan_value(&self) -> f64 {
        self.total_loan_value
    }

    pub fn net_worth(&self) -> f64 {
        self.net_worth
    }

    pub fn asset(&self, id: &str) -> Option<&HoldingRecord> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn loan(&self, id: &str) -> Option<&LoanRecord> {
        self.loans.iter().find(|l| l.id == id)
    }

    /// The loan secured against an asset. Checks the asset's own
    /// `linked_loan_id` first, then any loan pointing back at the asset.
    pub fn loan_for_asset(&self, asset_id: &str) -> Option<&LoanRecord> {
        let via_asset = self
            .asset(asset_id)
            .and_then(|a| a.linked_loan_id.as_deref())
            .and_then(|loan_id| self.loan(loan_id));
        via_asset.or_else(|| self.loans.iter().find(|l| l.linked_asset_id == asset_id))
    }

    /// The asset a loan is linked to, or `None` if the reference dangles.
    pub fn asset_for_loan(&self, loan: &LoanRecord) -> Option<&HoldingRecord> {
        self.asset(&loan.linked_asset_id)
    }

    // ── Mutations (each one recomputes) ─────────────────────────────

    pub fn set_assets(&mut self, assets: Vec<HoldingRecord>) {
        self.assets = assets;
        self.recompute();
    }

    pub fn set_loans(&mut self, loans: Vec<LoanRecord>) {
        self.loans = loans;
        self.recompute();
    }

    /// Replace the asset with the same id, or append it.
    pub fn upsert_asset(&mut self, asset: HoldingRecord) {
        match self.assets.iter_mut().find(|a| a.id == asset.id) {
            Some(existing) => *existing = asset,
            None => self.assets.push(asset),
        }
        self.recompute();
    }

    /// Remove an asset explicitly. Loans linked to it are kept.
    pub fn remove_asset(&mut self, id: &str) -> Option<HoldingRecord> {
        let idx = self.assets.iter().position(|a| a.id == id)?;
        let removed = self.assets.remove(idx);
        self.recompute();
        Some(removed)
    }

    pub fn upsert_loan(&mut self, loan: LoanRecord) {
        match self.loans.iter_mut().find(|l| l.id == loan.id) {
            Some(existing) => *existing = loan,
            None => self.loans.push(loan),
        }
        self.recompute();
    }

    pub fn remove_loan(&mut self, id: &str) -> Option<LoanRecord> {
        let idx = self.loans.iter().position(|l| l.id == id)?;
        let removed = self.loans.remove(idx);
        self.recompute();
        Some(removed)
    }

    fn recompute(&mut self) {
        self.total_asset_value = self.assets.iter().map(|a| a.current_value()).sum();
        self.total_loan_value = self.loans.iter().map(|l| l.outstanding_balance).sum();
        self.net_worth = self.total_asset_value - self.total_loan_value;
    }
}
