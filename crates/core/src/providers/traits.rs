use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::holding::AssetClass;
use crate::models::quote::SpotQuote;

/// Source of live spot prices.
///
/// Each API (CoinGecko, metals.dev) implements this trait; the quote service
/// only ever talks to the trait, so a provider can be swapped or mocked
/// without touching the reconciliation logic.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SpotPriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which asset classes this provider can price.
    fn supported_asset_classes(&self) -> Vec<AssetClass>;

    /// Current price of one asset ("gold", "BTC").
    /// Fails with `QuoteProviderUnavailable`/`Network` on transport errors
    /// and `Api` when the response cannot be used.
    async fn get_spot_price(&self, identifier: &str) -> Result<SpotQuote, CoreError>;

    /// Current prices for several assets. Either every identifier is priced or the call fails.
    ///
    /// The default asks for each identifier in turn; providers with a
    /// multi-asset endpoint override it with a single request.
    async fn get_spot_prices(&self, identifiers: &[String]) -> Result<Vec<SpotQuote>, CoreError> {
        let mut quotes = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            quotes.push(self.get_spot_price(identifier).await?);
        }
        Ok(quotes)
    }
}
