use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::holding::HoldingRecord;
use crate::models::loan::LoanRecord;
use crate::models::settings::Settings;

/// Supplies the asset and loan collections. Records are taken as already validated;
/// dangling loan links are left for lookups to treat as absent.
pub trait HoldingDataSource {
    fn load_holdings(&self) -> Result<Vec<HoldingRecord>, CoreError>;
    fn load_loans(&self) -> Result<Vec<LoanRecord>, CoreError>;
}

/// Portable JSON shape of the authoritative collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub holdings: Vec<HoldingRecord>,
    #[serde(default)]
    pub loans: Vec<LoanRecord>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

/// Data source backed by an in-memory JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct JsonSnapshotSource {
    snapshot: Snapshot,
}

impl JsonSnapshotSource {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(Self {
            snapshot: serde_json::from_str(json)?,
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

impl HoldingDataSource for JsonSnapshotSource {
    fn load_holdings(&self) -> Result<Vec<HoldingRecord>, CoreError> {
        Ok(self.snapshot.holdings.clone())
    }

    fn load_loans(&self) -> Result<Vec<LoanRecord>, CoreError> {
        Ok(self.snapshot.loans.clone())
    }
}

/// Parse and validate settings JSON. Missing fields take their defaults.
pub fn load_settings(json: &str) -> Result<Settings, CoreError> {
    let settings: Settings = serde_json::from_str(json)?;
    settings.validate()?;
    Ok(settings)
}
