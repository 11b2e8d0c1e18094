use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// The closed set of asset classes a holding can belong to.
/// Determines which class-specific details apply and whether the price is live-fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Bank / post-office term deposits, priced manually
    FixedDeposit,
    /// Gold, silver, platinum, palladium (live-priced per gram)
    PreciousMetal,
    /// Cryptocurrencies, live-priced via CoinGecko
    Crypto,
    /// Property, priced manually (per sqft)
    RealEstate,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::FixedDeposit,
        AssetClass::PreciousMetal,
        AssetClass::Crypto,
        AssetClass::RealEstate,
    ];
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::FixedDeposit => write!(f, "Fixed Deposit"),
            AssetClass::PreciousMetal => write!(f, "Precious Metal"),
            AssetClass::Crypto => write!(f, "Crypto"),
            AssetClass::RealEstate => write!(f, "Real Estate"),
        }
    }
}

// ── Fixed deposits ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositType {
    BankFd,
    PostOfficeTd,
    CorporateFd,
    TaxSaverFd,
    SeniorCitizenFd,
    Nsc,
    Kvp,
}

impl std::fmt::Display for DepositType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositType::BankFd => write!(f, "Bank FD"),
            DepositType::PostOfficeTd => write!(f, "Post Office TD"),
            DepositType::CorporateFd => write!(f, "Corporate FD"),
            DepositType::TaxSaverFd => write!(f, "Tax Saver FD"),
            DepositType::SeniorCitizenFd => write!(f, "Senior Citizen FD"),
            DepositType::Nsc => write!(f, "NSC"),
            DepositType::Kvp => write!(f, "KVP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositStatus {
    Active,
    Matured,
    PrematureClosed,
}

impl std::fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositStatus::Active => write!(f, "Active"),
            DepositStatus::Matured => write!(f, "Matured"),
            DepositStatus::PrematureClosed => write!(f, "Premature Closed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestPayout {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
    AtMaturity,
}

/// Deposit-specific attributes. Not touched by the shared derivation logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositDetails {
    pub bank_name: String,
    pub deposit_type: DepositType,
    pub interest_rate_percent: f64,
    pub tenure_months: u32,
    pub maturity_date: NaiveDate,
    pub maturity_amount: f64,
    /// Interest earned over the full tenure
    pub interest_earned: f64,
    /// Interest accrued so far
    pub interest_accrued: f64,
    pub status: DepositStatus,
    pub interest_payout: InterestPayout,
    #[serde(default)]
    pub auto_renewal: bool,
}

// ── Precious metals ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetalType {
    Gold,
    Silver,
    Platinum,
    Palladium,
}

impl MetalType {
    pub const ALL: [MetalType; 4] = [
        MetalType::Gold,
        MetalType::Silver,
        MetalType::Platinum,
        MetalType::Palladium,
    ];

    /// Inverse of [`quote_identifier`](Self::quote_identifier), case-insensitive.
    pub fn from_quote_identifier(identifier: &str) -> Option<MetalType> {
        let lower = identifier.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.quote_identifier() == lower)
    }

    /// Identifier used when asking a price provider for this metal's spot price.
    pub fn quote_identifier(&self) -> &'static str {
        match self {
            MetalType::Gold => "gold",
            MetalType::Silver => "silver",
            MetalType::Platinum => "platinum",
            MetalType::Palladium => "palladium",
        }
    }
}

impl std::fmt::Display for MetalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetalType::Gold => write!(f, "Gold"),
            MetalType::Silver => write!(f, "Silver"),
            MetalType::Platinum => write!(f, "Platinum"),
            MetalType::Palladium => write!(f, "Palladium"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetalForm {
    Coin,
    Bar,
    Biscuit,
    Jewelry,
    Etf,
}

impl std::fmt::Display for MetalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetalForm::Coin => write!(f, "Coin"),
            MetalForm::Bar => write!(f, "Bar"),
            MetalForm::Biscuit => write!(f, "Biscuit"),
            MetalForm::Jewelry => write!(f, "Jewelry"),
            MetalForm::Etf => write!(f, "ETF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalDetails {
    pub metal: MetalType,
    pub form: MetalForm,
    /// e.g. "24K", "22K", "999"
    pub purity: String,
    pub storage_location: String,
    #[serde(default)]
    pub vendor: Option<String>,
}

// ── Crypto ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoDetails {
    /// Ticker symbol, uppercased (e.g., "BTC")
    pub symbol: String,
    #[serde(default)]
    pub wallet: Option<String>,
}

// ── Real estate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateReminder {
    pub enabled: bool,
    pub interval_months: u32,
    pub next_reminder_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub location: String,
    /// e.g. "Residential Property", "Plot"
    pub property_type: String,
    #[serde(default)]
    pub update_reminder: Option<UpdateReminder>,
}

/// Per-class payload carried alongside the shared holding fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "asset_class")]
pub enum HoldingDetails {
    FixedDeposit(DepositDetails),
    PreciousMetal(MetalDetails),
    Crypto(CryptoDetails),
    RealEstate(PropertyDetails),
}

impl HoldingDetails {
    pub fn asset_class(&self) -> AssetClass {
        match self {
            HoldingDetails::FixedDeposit(_) => AssetClass::FixedDeposit,
            HoldingDetails::PreciousMetal(_) => AssetClass::PreciousMetal,
            HoldingDetails::Crypto(_) => AssetClass::Crypto,
            HoldingDetails::RealEstate(_) => AssetClass::RealEstate,
        }
    }
}

/// One owned position in an asset class.
///
/// `current_value` is always `quantity × current_unit_price`. The three fields
/// (and `last_updated_at`) are private: the only write paths are
/// [`set_quantity`](Self::set_quantity), [`set_unit_price`](Self::set_unit_price)
/// and the live price reconciler, each of which recomputes the value.
/// Deserialization recomputes it too, so a stale value in input data is discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HoldingRecordData")]
pub struct HoldingRecord {
    /// Stable unique identifier
    pub id: String,

    /// Display name (e.g., "Sovereign Gold Bond", "Bitcoin Wallet")
    pub name: String,

    /// Units owned: grams, coins, sqft (1 for a deposit)
    quantity: f64,

    /// Price per unit at acquisition
    pub unit_cost_basis: f64,

    pub acquisition_date: NaiveDate,

    /// Price per unit as of `last_updated_at`
    current_unit_price: f64,

    current_value: f64,

    last_updated_at: DateTime<Utc>,

    /// Weak reference to a loan taken against this asset.
    #[serde(default)]
    pub linked_loan_id: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    pub details: HoldingDetails,
}

/// Wire shape of a holding. Any `current_value` in the input is ignored.
#[derive(Deserialize)]
struct HoldingRecordData {
    id: String,
    name: String,
    quantity: f64,
    unit_cost_basis: f64,
    acquisition_date: NaiveDate,
    current_unit_price: f64,
    last_updated_at: DateTime<Utc>,
    #[serde(default)]
    linked_loan_id: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    details: HoldingDetails,
}

impl From<HoldingRecordData> for HoldingRecord {
    fn from(data: HoldingRecordData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            quantity: data.quantity,
            unit_cost_basis: data.unit_cost_basis,
            acquisition_date: data.acquisition_date,
            current_unit_price: data.current_unit_price,
            current_value: data.quantity * data.current_unit_price,
            last_updated_at: data.last_updated_at,
            linked_loan_id: data.linked_loan_id,
            notes: data.notes,
            details: data.details,
        }
    }
}

impl HoldingRecord {
    /// Create a holding priced at its cost basis, with a fresh UUID.
    /// `last_updated_at` starts at midnight UTC of the acquisition date.
    pub fn new(
        name: impl Into<String>,
        details: HoldingDetails,
        quantity: f64,
        unit_cost_basis: f64,
        acquisition_date: NaiveDate,
    ) -> Self {
        let last_updated_at = acquisition_date.and_time(chrono::NaiveTime::MIN).and_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            quantity,
            unit_cost_basis,
            acquisition_date,
            current_unit_price: unit_cost_basis,
            current_value: quantity * unit_cost_basis,
            last_updated_at,
            linked_loan_id: None,
            notes: None,
            details,
        }
    }

    /// A fixed deposit: one unit whose cost basis is the principal.
    pub fn deposit(
        name: impl Into<String>,
        details: DepositDetails,
        principal: f64,
        start_date: NaiveDate,
    ) -> Self {
        Self::new(name, HoldingDetails::FixedDeposit(details), 1.0, principal, start_date)
    }

    /// A metal lot measured in grams.
    pub fn metal(
        name: impl Into<String>,
        details: MetalDetails,
        grams: f64,
        cost_per_gram: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self::new(name, HoldingDetails::PreciousMetal(details), grams, cost_per_gram, purchase_date)
    }

    /// A crypto position. The symbol is uppercased.
    pub fn crypto(
        name: impl Into<String>,
        symbol: impl Into<String>,
        coins: f64,
        cost_per_coin: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        let details = CryptoDetails {
            symbol: symbol.into().to_uppercase(),
            wallet: None,
        };
        Self::new(name, HoldingDetails::Crypto(details), coins, cost_per_coin, purchase_date)
    }

    /// A property measured in sqft.
    pub fn property(
        name: impl Into<String>,
        details: PropertyDetails,
        sqft: f64,
        cost_per_sqft: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self::new(name, HoldingDetails::RealEstate(details), sqft, cost_per_sqft, purchase_date)
    }

    // ── Builder-style setters ───────────────────────────────────────

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the current unit price and its timestamp. Intended for seeding data;
    /// use [`set_unit_price`](Self::set_unit_price) for validated edits.
    pub fn priced_at(mut self, unit_price: f64, at: DateTime<Utc>) -> Self {
        self.reprice(unit_price, at);
        self
    }

    pub fn with_loan(mut self, loan_id: impl Into<String>) -> Self {
        self.linked_loan_id = Some(loan_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn asset_class(&self) -> AssetClass {
        self.details.asset_class()
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn current_unit_price(&self) -> f64 {
        self.current_unit_price
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn last_updated_at(&self) -> DateTime<Utc> {
        self.last_updated_at
    }

    /// `quantity × unit_cost_basis`
    pub fn invested(&self) -> f64 {
        self.quantity * self.unit_cost_basis
    }

    pub fn gain(&self) -> f64 {
        self.current_value - self.invested()
    }

    /// Identifier a live price provider knows this holding by, if it is live-priced.
    /// Metals map to their lowercase name ("gold"), crypto to its uppercase symbol.
    /// Deposits and property are priced manually and return `None`.
    pub fn quote_identifier(&self) -> Option<String> {
        match &self.details {
            HoldingDetails::PreciousMetal(m) => Some(m.metal.quote_identifier().to_string()),
            HoldingDetails::Crypto(c) => Some(c.symbol.to_uppercase()),
            HoldingDetails::FixedDeposit(_) | HoldingDetails::RealEstate(_) => None,
        }
    }

    pub fn as_deposit(&self) -> Option<&DepositDetails> {
        match &self.details {
            HoldingDetails::FixedDeposit(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_metal(&self) -> Option<&MetalDetails> {
        match &self.details {
            HoldingDetails::PreciousMetal(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_crypto(&self) -> Option<&CryptoDetails> {
        match &self.details {
            HoldingDetails::Crypto(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDetails> {
        match &self.details {
            HoldingDetails::RealEstate(p) => Some(p),
            _ => None,
        }
    }

    // ── Manual edits ────────────────────────────────────────────────

    /// Manually change the owned quantity. Recomputes `current_value`.
    pub fn set_quantity(&mut self, quantity: f64) -> Result<(), CoreError> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity must be finite and non-negative, got {quantity}"
            )));
        }
        self.quantity = quantity;
        self.current_value = self.quantity * self.current_unit_price;
        Ok(())
    }

    /// Manually enter a new unit price (e.g. a property revaluation).
    /// Recomputes `current_value` and stamps `last_updated_at`.
    pub fn set_unit_price(&mut self, unit_price: f64, at: DateTime<Utc>) -> Result<(), CoreError> {
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Unit price must be finite and non-negative, got {unit_price}"
            )));
        }
        self.reprice(unit_price, at);
        Ok(())
    }

    /// Single write path for price, value and timestamp.
    pub(crate) fn reprice(&mut self, unit_price: f64, at: DateTime<Utc>) {
        self.current_unit_price = unit_price;
        self.current_value = self.quantity * unit_price;
        self.last_updated_at = at;
    }
}
