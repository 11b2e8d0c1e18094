use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// User-configurable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The currency prices are requested and displayed in (e.g., "INR", "USD").
    pub currency: String,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "metals_dev"). Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Crypto symbols to include in every live refresh.
    pub tracked_crypto: Vec<String>,

    /// Whether the gold spot price is part of every live refresh.
    pub track_gold: bool,

    /// Extra attempts per provider call on a network failure. At most 1.
    pub max_fetch_retries: u8,

    /// Live-priced holdings older than this are reported as stale.
    pub staleness_threshold_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            api_keys: HashMap::new(),
            tracked_crypto: vec!["BTC".to_string(), "ETH".to_string()],
            track_gold: true,
            max_fetch_retries: 1,
            staleness_threshold_minutes: 60,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), CoreError> {
        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{}': must be exactly 3 ASCII letters (e.g., INR, USD)",
                self.currency
            )));
        }
        if self.max_fetch_retries > 1 {
            return Err(CoreError::ValidationError(format!(
                "max_fetch_retries is {}, at most 1 retry is allowed",
                self.max_fetch_retries
            )));
        }
        if self.staleness_threshold_minutes <= 0 {
            return Err(CoreError::ValidationError(
                "staleness_threshold_minutes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn staleness_threshold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.staleness_threshold_minutes)
    }

    /// Identifiers requested on each live refresh: "gold" first, then crypto symbols uppercased.
    pub fn tracked_identifiers(&self) -> Vec<String> {
        let mut ids = Vec::new();
        if self.track_gold {
            ids.push("gold".to_string());
        }
        for symbol in &self.tracked_crypto {
            let upper = symbol.trim().to_uppercase();
            if !upper.is_empty() && !ids.contains(&upper) {
                ids.push(upper);
            }
        }
        ids
    }
}
