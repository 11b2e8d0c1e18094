use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

use super::holding::{AssetClass, DepositStatus, HoldingDetails, HoldingRecord, MetalType};

/// Strip case and separators so "currentValue", "current_value" and "Current Value" all match.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Column a holdings table can be sorted by.
///
/// Fields below the "class-specific" line only exist on some asset classes;
/// sorting a record that lacks the field fails with `UnsortableField`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Name,
    AssetClass,
    Quantity,
    UnitCostBasis,
    Invested,
    CurrentUnitPrice,
    CurrentValue,
    Gain,
    ReturnPercent,
    AcquisitionDate,
    LastUpdatedAt,
    // class-specific
    BankName,
    InterestRate,
    MaturityDate,
    MaturityAmount,
    MetalType,
    Purity,
    Symbol,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::AssetClass => "asset_class",
            SortField::Quantity => "quantity",
            SortField::UnitCostBasis => "unit_cost_basis",
            SortField::Invested => "invested",
            SortField::CurrentUnitPrice => "current_unit_price",
            SortField::CurrentValue => "current_value",
            SortField::Gain => "gain",
            SortField::ReturnPercent => "return_percent",
            SortField::AcquisitionDate => "acquisition_date",
            SortField::LastUpdatedAt => "last_updated_at",
            SortField::BankName => "bank_name",
            SortField::InterestRate => "interest_rate",
            SortField::MaturityDate => "maturity_date",
            SortField::MaturityAmount => "maturity_amount",
            SortField::MetalType => "metal_type",
            SortField::Purity => "purity",
            SortField::Symbol => "symbol",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match normalize(s).as_str() {
            "name" => SortField::Name,
            "assetclass" => SortField::AssetClass,
            "quantity" | "weightgrams" => SortField::Quantity,
            "unitcostbasis" | "buyprice" => SortField::UnitCostBasis,
            "invested" | "principalamount" | "totalpurchaseprice" => SortField::Invested,
            "currentunitprice" => SortField::CurrentUnitPrice,
            "currentvalue" => SortField::CurrentValue,
            "gain" | "profitloss" => SortField::Gain,
            "returnpercent" => SortField::ReturnPercent,
            "acquisitiondate" | "purchasedate" | "startdate" => SortField::AcquisitionDate,
            "lastupdatedat" => SortField::LastUpdatedAt,
            "bankname" => SortField::BankName,
            "interestrate" => SortField::InterestRate,
            "maturitydate" => SortField::MaturityDate,
            "maturityamount" => SortField::MaturityAmount,
            "metaltype" => SortField::MetalType,
            "purity" => SortField::Purity,
            "symbol" => SortField::Symbol,
            _ => return Err(CoreError::UnsortableField(s.to_string())),
        };
        Ok(field)
    }
}

/// Row filter for the holdings tables. `All` is the identity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldingFilter {
    All,
    Class(AssetClass),
    /// Deposits with this status; other classes are excluded
    DepositStatus(DepositStatus),
    /// Metal lots of this type; other classes are excluded
    Metal(MetalType),
}

impl HoldingFilter {
    pub fn matches(&self, record: &HoldingRecord) -> bool {
        match self {
            HoldingFilter::All => true,
            HoldingFilter::Class(class) => record.asset_class() == *class,
            HoldingFilter::DepositStatus(status) => {
                record.as_deposit().is_some_and(|d| d.status == *status)
            }
            HoldingFilter::Metal(metal) => record.as_metal().is_some_and(|m| m.metal == *metal),
        }
    }
}

impl FromStr for HoldingFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let filter = match normalize(s).as_str() {
            "all" => HoldingFilter::All,
            "active" => HoldingFilter::DepositStatus(DepositStatus::Active),
            "matured" => HoldingFilter::DepositStatus(DepositStatus::Matured),
            "prematureclosed" => HoldingFilter::DepositStatus(DepositStatus::PrematureClosed),
            "gold" => HoldingFilter::Metal(MetalType::Gold),
            "silver" => HoldingFilter::Metal(MetalType::Silver),
            "platinum" => HoldingFilter::Metal(MetalType::Platinum),
            "palladium" => HoldingFilter::Metal(MetalType::Palladium),
            "fixeddeposit" => HoldingFilter::Class(AssetClass::FixedDeposit),
            "preciousmetal" => HoldingFilter::Class(AssetClass::PreciousMetal),
            "crypto" => HoldingFilter::Class(AssetClass::Crypto),
            "realestate" => HoldingFilter::Class(AssetClass::RealEstate),
            _ => return Err(CoreError::UnknownCategoryKey(s.to_string())),
        };
        Ok(filter)
    }
}

/// Grouping key for allocation breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKey {
    AssetClass,
    MetalType,
    MetalForm,
    StorageLocation,
    BankName,
    DepositType,
    DepositStatus,
    Symbol,
    Location,
}

impl CategoryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::AssetClass => "asset_class",
            CategoryKey::MetalType => "metal_type",
            CategoryKey::MetalForm => "metal_form",
            CategoryKey::StorageLocation => "storage_location",
            CategoryKey::BankName => "bank_name",
            CategoryKey::DepositType => "deposit_type",
            CategoryKey::DepositStatus => "deposit_status",
            CategoryKey::Symbol => "symbol",
            CategoryKey::Location => "location",
        }
    }

    /// Group label for one record.
    ///
    /// Fails with `UnknownCategoryKey` when the key does not apply to the
    /// record's class (e.g. `BankName` on a metal lot).
    pub fn key_for(&self, record: &HoldingRecord) -> Result<String, CoreError> {
        let key = match (self, &record.details) {
            (CategoryKey::AssetClass, _) => Some(record.asset_class().to_string()),
            (CategoryKey::MetalType, HoldingDetails::PreciousMetal(m)) => Some(m.metal.to_string()),
            (CategoryKey::MetalForm, HoldingDetails::PreciousMetal(m)) => Some(m.form.to_string()),
            (CategoryKey::StorageLocation, HoldingDetails::PreciousMetal(m)) => {
                Some(m.storage_location.clone())
            }
            (CategoryKey::BankName, HoldingDetails::FixedDeposit(d)) => Some(d.bank_name.clone()),
            (CategoryKey::DepositType, HoldingDetails::FixedDeposit(d)) => {
                Some(d.deposit_type.to_string())
            }
            (CategoryKey::DepositStatus, HoldingDetails::FixedDeposit(d)) => {
                Some(d.status.to_string())
            }
            (CategoryKey::Symbol, HoldingDetails::Crypto(c)) => Some(c.symbol.clone()),
            (CategoryKey::Location, HoldingDetails::RealEstate(p)) => Some(p.location.clone()),
            _ => None,
        };
        key.ok_or_else(|| {
            CoreError::UnknownCategoryKey(format!(
                "{} does not apply to {} holding '{}'",
                self.as_str(),
                record.asset_class(),
                record.id
            ))
        })
    }
}

impl FromStr for CategoryKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match normalize(s).as_str() {
            "assetclass" => CategoryKey::AssetClass,
            "metaltype" => CategoryKey::MetalType,
            "metalform" | "form" => CategoryKey::MetalForm,
            "storagelocation" => CategoryKey::StorageLocation,
            "bankname" => CategoryKey::BankName,
            "deposittype" | "fdtype" => CategoryKey::DepositType,
            "depositstatus" | "status" => CategoryKey::DepositStatus,
            "symbol" => CategoryKey::Symbol,
            "location" => CategoryKey::Location,
            _ => return Err(CoreError::UnknownCategoryKey(s.to_string())),
        };
        Ok(key)
    }
}
