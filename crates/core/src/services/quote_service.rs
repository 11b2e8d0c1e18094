use chrono::Utc;
use log::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::holding::{AssetClass, MetalType};
use crate::models::quote::{QuoteBatch, SpotQuote};
use crate::models::settings::Settings;
use crate::providers::registry::PriceProviderRegistry;
use crate::providers::traits::SpotPriceProvider;

/// Fetches live spot prices as complete batches.
///
/// Each identifier is routed to the providers for its asset class ("gold" and
/// the other metal names go to metal providers, everything else is treated as
/// a crypto symbol). Providers are tried in registration order; a provider
/// call that fails with a network-class error is retried at most
/// `max_retries` times before moving on to the next provider.
///
/// A batch either contains a valid quote for every requested identifier or
/// the whole fetch fails. Nothing here touches the cache: the caller commits
/// the returned batch.
pub struct QuoteService {
    registry: PriceProviderRegistry,
    max_retries: u8,
}

impl QuoteService {
    pub fn new(registry: PriceProviderRegistry, max_retries: u8) -> Self {
        Self {
            registry,
            max_retries: max_retries.min(1),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            PriceProviderRegistry::new_with_defaults(settings),
            settings.max_fetch_retries,
        )
    }

    /// Check if at least one provider is available for a given asset class.
    pub fn has_provider_for(&self, asset_class: &AssetClass) -> bool {
        self.registry.get_provider_for(asset_class).is_some()
    }

    pub fn get_provider_names(&self, asset_class: &AssetClass) -> Vec<String> {
        self.registry
            .get_providers_for(asset_class)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Asset class whose providers can price `identifier`.
    pub fn classify(identifier: &str) -> AssetClass {
        if MetalType::from_quote_identifier(identifier).is_some() {
            AssetClass::PreciousMetal
        } else {
            AssetClass::Crypto
        }
    }

    /// Canonical identifier, matching [`HoldingRecord::quote_identifier`](crate::models::holding::HoldingRecord::quote_identifier):
    /// metal names lowercase ("gold"), crypto symbols uppercase ("BTC").
    pub fn normalize_identifier(identifier: &str) -> String {
        match MetalType::from_quote_identifier(identifier) {
            Some(metal) => metal.quote_identifier().to_string(),
            None => identifier.trim().to_uppercase(),
        }
    }

    /// Fetch every identifier, stamping the batch with its completion instant.
    /// Identifiers are normalized first, so "btc" and "BTC" are the same request.
    pub async fn fetch_batch(&self, identifiers: &[String]) -> Result<QuoteBatch, CoreError> {
        let mut groups: Vec<(AssetClass, Vec<String>)> = Vec::new();
        for identifier in identifiers.iter().map(|id| Self::normalize_identifier(id)) {
            let class = Self::classify(&identifier);
            match groups.iter_mut().find(|(c, _)| *c == class) {
                Some((_, ids)) => {
                    if !ids.contains(&identifier) {
                        ids.push(identifier);
                    }
                }
                None => groups.push((class, vec![identifier])),
            }
        }

        let mut quotes = Vec::with_capacity(identifiers.len());
        for (class, ids) in &groups {
            quotes.extend(self.fetch_group(class, ids).await?);
        }

        let batch = QuoteBatch::new(quotes, Utc::now());
        info!("Fetched {} live quotes", batch.len());
        Ok(batch)
    }

    /// One asset class, with provider fallback.
    async fn fetch_group(
        &self,
        asset_class: &AssetClass,
        identifiers: &[String],
    ) -> Result<Vec<SpotQuote>, CoreError> {
        let providers = self.registry.get_providers_for(asset_class);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(asset_class.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            let result = self
                .fetch_with_retry(*provider, identifiers)
                .await
                .and_then(|quotes| Self::validate(provider.name(), identifiers, quotes));
            match result {
                Ok(quotes) => return Ok(quotes),
                Err(e) => {
                    warn!(
                        "{} failed for {:?}: {e}; trying next provider",
                        provider.name(),
                        identifiers
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(asset_class.to_string())))
    }

    async fn fetch_with_retry(
        &self,
        provider: &dyn SpotPriceProvider,
        identifiers: &[String],
    ) -> Result<Vec<SpotQuote>, CoreError> {
        let mut attempt = 0u8;
        loop {
            match provider.get_spot_prices(identifiers).await {
                Ok(quotes) => return Ok(quotes),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    debug!("Retrying {} after transient error: {e}", provider.name());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Every requested identifier present with a finite, non-negative price.
    fn validate(
        provider: &str,
        identifiers: &[String],
        quotes: Vec<SpotQuote>,
    ) -> Result<Vec<SpotQuote>, CoreError> {
        for quote in &quotes {
            if !quote.price_per_unit.is_finite() || quote.price_per_unit < 0.0 {
                return Err(CoreError::InvalidQuote {
                    identifier: quote.identifier.clone(),
                    price: quote.price_per_unit,
                });
            }
        }
        if let Some(missing) = identifiers
            .iter()
            .find(|id| !quotes.iter().any(|q| &q.identifier == *id))
        {
            return Err(CoreError::Api {
                provider: provider.to_string(),
                message: format!("No quote returned for {missing}"),
            });
        }
        Ok(quotes)
    }
}
