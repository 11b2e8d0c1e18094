pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;

use chrono::{DateTime, Utc};
use log::{info, warn};
use models::{
    aggregate::{Appreciation, CategoryBreakdown, PortfolioAggregate},
    holding::{AssetClass, HoldingRecord},
    loan::LoanRecord,
    net_worth::NetWorthState,
    query::CategoryKey,
    quote::{QuoteBatch, QuoteCache},
    settings::Settings,
    summary::{DepositSummary, MetalSummary, UpcomingMaturity},
    table::TableState,
};
use serde::{Deserialize, Serialize};
use services::{
    data_source::{HoldingDataSource, Snapshot},
    deposit_summary, derivation, metal_summary, net_worth,
    quote_service::QuoteService,
    reconciler,
    staleness::{self, StalenessCheck},
};

use errors::CoreError;

/// How many upcoming maturities the dashboard lists.
pub const DEFAULT_MATURITY_LIMIT: usize = 5;

/// Result of one live price refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The batch was committed; `updated` holdings were repriced.
    Fresh { updated: usize },
    /// The fetch failed and the previous quotes remain in effect.
    Stale {
        last_good_at: Option<DateTime<Utc>>,
        reason: String,
    },
}

impl RefreshOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, RefreshOutcome::Fresh { .. })
    }
}

/// Main entry point for the Vault core library.
///
/// Owns the authoritative asset and loan collections, the settings, and the
/// last known good quotes. Every aggregate is recomputed from the collections
/// on read; nothing derived is cached here.
#[must_use]
pub struct Vault {
    state: NetWorthState,
    settings: Settings,
    quote_cache: QuoteCache,
    quote_service: QuoteService,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("assets", &self.state.assets().len())
            .field("loans", &self.state.loans().len())
            .field("settings", &self.settings)
            .field("cached_quotes", &self.quote_cache.len())
            .finish()
    }
}

impl Vault {
    /// Empty vault with default settings.
    pub fn create_new() -> Self {
        Self::build(NetWorthState::default(), Settings::default())
    }

    /// Empty vault with the given settings (validated).
    pub fn with_settings(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(NetWorthState::default(), settings))
    }

    /// Load both collections from a data source.
    pub fn from_source(
        source: &dyn HoldingDataSource,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let state = net_worth::recompute_net_worth(source.load_holdings()?, source.load_loans()?);
        info!(
            "Loaded {} holdings and {} loans",
            state.assets().len(),
            state.loans().len()
        );
        Ok(Self::build(state, settings))
    }

    /// Swap the live price service (e.g. for a custom provider registry).
    pub fn with_quote_service(mut self, quote_service: QuoteService) -> Self {
        self.quote_service = quote_service;
        self
    }

    /// Serialize the collections as `{ "holdings": [...], "loans": [...] }`.
    pub fn export_snapshot(&self) -> Result<String, CoreError> {
        Snapshot {
            holdings: self.state.assets().to_vec(),
            loans: self.state.loans().to_vec(),
        }
        .to_json()
    }

    // ── Collections ─────────────────────────────────────────────────

    #[must_use]
    pub fn holdings(&self) -> &[HoldingRecord] {
        self.state.assets()
    }

    #[must_use]
    pub fn loans(&self) -> &[LoanRecord] {
        self.state.loans()
    }

    pub fn holding(&self, id: &str) -> Option<&HoldingRecord> {
        self.state.asset(id)
    }

    #[must_use]
    pub fn holdings_of_class(&self, asset_class: AssetClass) -> Vec<&HoldingRecord> {
        self.state
            .assets()
            .iter()
            .filter(|r| r.asset_class() == asset_class)
            .collect()
    }

    /// Add a holding (replacing one with the same id). Returns its id.
    pub fn add_asset(&mut self, record: HoldingRecord) -> String {
        let id = record.id.clone();
        self.state.upsert_asset(record);
        id
    }

    /// Explicit removal. Loans linked to the asset are kept and their link dangles.
    pub fn remove_asset(&mut self, id: &str) -> Result<HoldingRecord, CoreError> {
        self.state
            .remove_asset(id)
            .ok_or_else(|| CoreError::RecordNotFound(id.to_string()))
    }

    pub fn add_loan(&mut self, loan: LoanRecord) -> String {
        let id = loan.id.clone();
        self.state.upsert_loan(loan);
        id
    }

    pub fn remove_loan(&mut self, id: &str) -> Result<LoanRecord, CoreError> {
        self.state
            .remove_loan(id)
            .ok_or_else(|| CoreError::RecordNotFound(id.to_string()))
    }

    // ── Manual edits ────────────────────────────────────────────────

    /// Manually set a holding's unit price (deposits and property are only priced this way).
    pub fn set_unit_price(
        &mut self,
        id: &str,
        unit_price: f64,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let mut record = self.require_holding(id)?.clone();
        record.set_unit_price(unit_price, at)?;
        self.state.upsert_asset(record);
        Ok(())
    }

    pub fn set_quantity(&mut self, id: &str, quantity: f64) -> Result<(), CoreError> {
        let mut record = self.require_holding(id)?.clone();
        record.set_quantity(quantity)?;
        self.state.upsert_asset(record);
        Ok(())
    }

    /// Fold one observed price into a holding. On `InvalidQuote` the stored record is untouched.
    pub fn apply_quote(
        &mut self,
        id: &str,
        unit_price: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let updated = reconciler::apply_live_quote(self.require_holding(id)?, unit_price, observed_at)?;
        self.state.upsert_asset(updated);
        Ok(())
    }

    // ── Views ───────────────────────────────────────────────────────

    #[must_use]
    pub fn summary(&self) -> PortfolioAggregate {
        derivation::summarize(self.state.assets())
    }

    pub fn breakdown(&self, key: CategoryKey) -> Result<Vec<CategoryBreakdown>, CoreError> {
        derivation::bucket_by_category(self.state.assets(), key)
    }

    /// Rows for a holdings table, filtered and sorted per `table`.
    pub fn table<'a>(&'a self, table: &TableState) -> Result<Vec<&'a HoldingRecord>, CoreError> {
        table.apply(self.state.assets())
    }

    pub fn net_worth(&self) -> &NetWorthState {
        &self.state
    }

    pub fn appreciation(&self, id: &str) -> Result<Appreciation, CoreError> {
        Ok(net_worth::appreciation_of(self.require_holding(id)?))
    }

    pub fn equity(&self, id: &str) -> Result<f64, CoreError> {
        net_worth::equity_of(&self.state, id)
    }

    pub fn upcoming_maturities(&self, now: DateTime<Utc>, limit: usize) -> Vec<UpcomingMaturity> {
        deposit_summary::upcoming_maturities(self.state.assets(), now, limit)
    }

    pub fn deposit_summary(&self, now: DateTime<Utc>) -> DepositSummary {
        deposit_summary::summarize_deposits(self.state.assets(), now)
    }

    pub fn metal_summary(&self) -> MetalSummary {
        metal_summary::summarize_metals(self.state.assets())
    }

    pub fn metal_allocation(&self) -> Vec<CategoryBreakdown> {
        metal_summary::metal_allocation(self.state.assets())
    }

    /// Live-priced holdings older than the configured staleness threshold.
    pub fn stale_holdings(&self, now: DateTime<Utc>) -> Vec<(&HoldingRecord, StalenessCheck)> {
        staleness::stale_holdings(
            self.state.assets(),
            now,
            self.settings.staleness_threshold(),
        )
    }

    // ── Live prices ─────────────────────────────────────────────────

    pub fn quote_cache(&self) -> &QuoteCache {
        &self.quote_cache
    }

    /// Identifiers requested on refresh: the tracked ones, then any held
    /// live-priced asset not already tracked.
    ///
    /// Identifiers whose asset class has no registered provider (e.g. metals
    /// without a metals.dev key) are skipped so the rest can still refresh.
    pub fn refresh_identifiers(&self) -> Vec<String> {
        let mut ids = self.settings.tracked_identifiers();
        for record in self.state.assets() {
            if let Some(id) = record.quote_identifier() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids.retain(|id| {
            let class = QuoteService::classify(id);
            let covered = self.quote_service.has_provider_for(&class);
            if !covered {
                warn!("Skipping {id} on refresh: no {class} price provider configured");
            }
            covered
        });
        ids
    }

    /// Fetch a complete batch without touching any state.
    pub async fn fetch_quotes(&self) -> Result<QuoteBatch, CoreError> {
        self.quote_service.fetch_batch(&self.refresh_identifiers()).await
    }

    /// Apply a completed batch to the holdings and the cache.
    ///
    /// Batches are ordered by completion: one that completed before the last
    /// committed batch is discarded. If any matched quote is invalid nothing
    /// changes. Returns how many holdings were repriced.
    pub fn commit_quotes(&mut self, batch: QuoteBatch) -> Result<usize, CoreError> {
        if let Some(last) = self.quote_cache.last_refreshed_at() {
            if batch.completed_at < last {
                info!(
                    "Discarding quote batch completed at {} (superseded by {last})",
                    batch.completed_at
                );
                return Ok(0);
            }
        }

        let updated = reconciler::apply_live_quotes(self.state.assets(), &batch.quotes)?;
        let repriced = self
            .state
            .assets()
            .iter()
            .filter_map(|r| r.quote_identifier())
            .filter(|id| batch.quotes.contains_key(id))
            .count();

        self.state.set_assets(updated);
        self.quote_cache.commit(batch);
        Ok(repriced)
    }

    /// Fetch and commit one batch. Failures never propagate: the previous
    /// quotes stay in effect and the outcome reports when they were fetched.
    pub async fn refresh_live_prices(&mut self) -> RefreshOutcome {
        let identifiers = self.refresh_identifiers();
        if identifiers.is_empty() {
            return RefreshOutcome::Fresh { updated: 0 };
        }

        let result = match self.quote_service.fetch_batch(&identifiers).await {
            Ok(batch) => self.commit_quotes(batch),
            Err(e) => Err(e),
        };
        match result {
            Ok(updated) => RefreshOutcome::Fresh { updated },
            Err(e) => {
                warn!("Live price refresh failed, keeping last known quotes: {e}");
                RefreshOutcome::Stale {
                    last_good_at: self.quote_cache.last_refreshed_at(),
                    reason: e.to_string(),
                }
            }
        }
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings and rebuild the providers from them.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate()?;
        self.settings = settings;
        self.quote_service = QuoteService::from_settings(&self.settings);
        Ok(())
    }

    /// Set an API key for a provider (e.g., "metals_dev").
    /// Rebuilds the provider registry so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: impl Into<String>, key: impl Into<String>) {
        self.settings.api_keys.insert(provider.into(), key.into());
        self.quote_service = QuoteService::from_settings(&self.settings);
    }

    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.quote_service = QuoteService::from_settings(&self.settings);
        }
        removed
    }

    // ── Provider Availability ───────────────────────────────────────

    #[must_use]
    pub fn is_provider_available(&self, asset_class: &AssetClass) -> bool {
        self.quote_service.has_provider_for(asset_class)
    }

    #[must_use]
    pub fn get_provider_names(&self, asset_class: &AssetClass) -> Vec<String> {
        self.quote_service.get_provider_names(asset_class)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn require_holding(&self, id: &str) -> Result<&HoldingRecord, CoreError> {
        self.state
            .asset(id)
            .ok_or_else(|| CoreError::RecordNotFound(id.to_string()))
    }

    fn build(state: NetWorthState, settings: Settings) -> Self {
        let quote_service = QuoteService::from_settings(&settings);
        Self {
            state,
            settings,
            quote_cache: QuoteCache::new(),
            quote_service,
        }
    }
}
