use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::SpotPriceProvider;
use crate::errors::CoreError;
use crate::models::holding::AssetClass;
use crate::models::quote::SpotQuote;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER: &str = "CoinGecko";

/// CoinGecko provider for cryptocurrency spot prices.
///
/// - **Free**: no API key for the public `/simple/price` endpoint.
/// - **Batching**: one request prices every tracked coin.
///
/// CoinGecko keys coins by id ("bitcoin"), not ticker. Common tickers are
/// mapped here; anything else is sent lowercased as-is.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    /// Lowercase quote currency, e.g. "inr"
    currency: String,
    symbol_map: HashMap<&'static str, &'static str>,
}

impl CoinGeckoProvider {
    pub fn new(currency: &str) -> Self {
        Self::with_base_url(BASE_URL, currency)
    }

    /// Point at another host (a local mock server in tests).
    pub fn with_base_url(base_url: impl Into<String>, currency: &str) -> Self {
        let symbol_map = HashMap::from([
            ("BTC", "bitcoin"),
            ("ETH", "ethereum"),
            ("USDT", "tether"),
            ("USDC", "usd-coin"),
            ("BNB", "binancecoin"),
            ("XRP", "ripple"),
            ("ADA", "cardano"),
            ("SOL", "solana"),
            ("DOGE", "dogecoin"),
            ("DOT", "polkadot"),
            ("MATIC", "matic-network"),
            ("LTC", "litecoin"),
            ("AVAX", "avalanche-2"),
            ("LINK", "chainlink"),
            ("TRX", "tron"),
        ]);

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            currency: currency.trim().to_lowercase(),
            symbol_map,
        }
    }

    /// "BTC" → "bitcoin". Unknown tickers pass through lowercased.
    pub fn resolve_id(&self, symbol: &str) -> String {
        let upper = symbol.trim().to_uppercase();
        self.symbol_map
            .get(upper.as_str())
            .map(|id| id.to_string())
            .unwrap_or_else(|| upper.to_lowercase())
    }

    fn quote_from(
        &self,
        symbol: &str,
        body: &serde_json::Value,
        observed_at: chrono::DateTime<Utc>,
    ) -> Result<SpotQuote, CoreError> {
        let id = self.resolve_id(symbol);
        let entry = body.get(&id).ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No price returned for {symbol} ({id})"),
        })?;
        let price = entry
            .get(&self.currency)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("No {} price for {symbol}", self.currency),
            })?;
        let change = entry
            .get(format!("{}_24h_change", self.currency))
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        Ok(SpotQuote::new(symbol.trim().to_uppercase(), price, observed_at).with_change(change))
    }
}

/// Map a non-success HTTP status to the error the quote service retries on.
pub(crate) fn status_error(provider: &str, status: StatusCode) -> CoreError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        CoreError::QuoteProviderUnavailable {
            provider: provider.to_string(),
            message: format!("HTTP {status}"),
        }
    } else {
        CoreError::Api {
            provider: provider.to_string(),
            message: format!("HTTP {status}"),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SpotPriceProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Crypto]
    }

    async fn get_spot_price(&self, identifier: &str) -> Result<SpotQuote, CoreError> {
        let mut quotes = self.get_spot_prices(&[identifier.to_string()]).await?;
        quotes.pop().ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Empty response for {identifier}"),
        })
    }

    async fn get_spot_prices(&self, identifiers: &[String]) -> Result<Vec<SpotQuote>, CoreError> {
        if identifiers.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = identifiers.iter().map(|s| self.resolve_id(s)).collect();
        let url = format!("{}/simple/price", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("ids", ids.join(",").as_str()),
                ("vs_currencies", self.currency.as_str()),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(PROVIDER, resp.status()));
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse price response: {e}"),
        })?;

        let observed_at = Utc::now();
        identifiers
            .iter()
            .map(|symbol| self.quote_from(symbol, &body, observed_at))
            .collect()
    }
}
