use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A spot price observed from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    /// Provider-facing identifier ("gold", "BTC")
    pub identifier: String,

    /// Current price per unit (per gram for metals, per coin for crypto)
    pub price_per_unit: f64,

    /// When the provider observed this price
    pub as_of: DateTime<Utc>,

    /// 24h change reported by the provider (0 when not reported)
    #[serde(default)]
    pub change_24h_percent: f64,
}

impl SpotQuote {
    pub fn new(identifier: impl Into<String>, price_per_unit: f64, as_of: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            price_per_unit,
            as_of,
            change_24h_percent: 0.0,
        }
    }

    pub fn with_change(mut self, change_24h_percent: f64) -> Self {
        self.change_24h_percent = change_24h_percent;
        self
    }
}

/// A complete set of quotes from one refresh cycle.
///
/// Only ever built when every requested identifier was fetched, so a batch
/// never mixes fresh and stale prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBatch {
    pub quotes: HashMap<String, SpotQuote>,
    pub completed_at: DateTime<Utc>,
}

impl QuoteBatch {
    pub fn new(quotes: Vec<SpotQuote>, completed_at: DateTime<Utc>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|q| (q.identifier.clone(), q))
                .collect(),
            completed_at,
        }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Last known good quotes.
///
/// Updated by [`commit`](Self::commit) only when a whole batch completes.
/// A failed refresh leaves it untouched and views keep rendering the old prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteCache {
    quotes: HashMap<String, SpotQuote>,
    last_refreshed_at: Option<DateTime<Utc>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<&SpotQuote> {
        self.quotes.get(identifier)
    }

    pub fn quotes(&self) -> &HashMap<String, SpotQuote> {
        &self.quotes
    }

    /// Completion instant of the last committed batch.
    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed_at
    }

    /// Install a completed batch. Identifiers absent from the batch keep their old quote.
    pub fn commit(&mut self, batch: QuoteBatch) {
        self.quotes.extend(batch.quotes);
        self.last_refreshed_at = Some(batch.completed_at);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn clear(&mut self) {
        self.quotes.clear();
        self.last_refreshed_at = None;
    }
}
