use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::coingecko::status_error;
use super::traits::SpotPriceProvider;
use crate::errors::CoreError;
use crate::models::holding::{AssetClass, MetalType};
use crate::models::quote::SpotQuote;

const BASE_URL: &str = "https://api.metals.dev/v1";
const PROVIDER: &str = "metals.dev";

/// metals.dev provider for precious metal spot prices, per gram.
///
/// - **Free tier**: 100 requests/month, so refreshes should stay infrequent.
/// - **Requires**: API key (settings key "metals_dev").
/// - **Batching**: `/latest` returns every metal at once.
pub struct MetalsDevProvider {
    client: Client,
    base_url: String,
    api_key: String,
    currency: String,
}

impl MetalsDevProvider {
    pub fn new(api_key: String, currency: &str) -> Self {
        Self::with_base_url(BASE_URL, api_key, currency)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: String, currency: &str) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            currency: currency.trim().to_uppercase(),
        }
    }

    fn resolve_metal(identifier: &str) -> Result<MetalType, CoreError> {
        MetalType::from_quote_identifier(identifier).ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!(
                "Unknown metal: {identifier}. Supported: gold, silver, platinum, palladium"
            ),
        })
    }

    async fn latest(&self) -> Result<LatestResponse, CoreError> {
        let url = format!("{}/latest", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("currency", self.currency.as_str()),
                ("unit", "g"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(PROVIDER, resp.status()));
        }

        let latest: LatestResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse latest prices: {e}"),
        })?;
        if latest.status.as_deref() == Some("failure") {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: latest
                    .error_message
                    .unwrap_or_else(|| "request rejected".to_string()),
            });
        }
        Ok(latest)
    }
}

// ── metals.dev API response types ───────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    metals: HashMap<String, f64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SpotPriceProvider for MetalsDevProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::PreciousMetal]
    }

    async fn get_spot_price(&self, identifier: &str) -> Result<SpotQuote, CoreError> {
        let mut quotes = self.get_spot_prices(&[identifier.to_string()]).await?;
        quotes.pop().ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Empty response for {identifier}"),
        })
    }

    async fn get_spot_prices(&self, identifiers: &[String]) -> Result<Vec<SpotQuote>, CoreError> {
        let metals = identifiers
            .iter()
            .map(|id| Self::resolve_metal(id))
            .collect::<Result<Vec<_>, _>>()?;
        if metals.is_empty() {
            return Ok(Vec::new());
        }

        let latest = self.latest().await?;
        let observed_at = Utc::now();

        metals
            .into_iter()
            .map(|metal| {
                let name = metal.quote_identifier();
                latest
                    .metals
                    .get(name)
                    .map(|price| SpotQuote::new(name, *price, observed_at))
                    .ok_or_else(|| CoreError::Api {
                        provider: PROVIDER.into(),
                        message: format!("No {} price for {name}", self.currency),
                    })
            })
            .collect()
    }
}
