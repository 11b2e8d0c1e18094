use crate::models::holding::AssetClass;
use crate::models::settings::Settings;

use super::coingecko::CoinGeckoProvider;
use super::metals_dev::MetalsDevProvider;
use super::traits::SpotPriceProvider;

/// Registry of spot price providers, in priority order.
///
/// Routes requests by `AssetClass`. When several providers cover the same
/// class the earlier registration is the primary and the rest are fallbacks.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn SpotPriceProvider>>,
}

impl PriceProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registry with the stock providers for `settings`.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        // CoinGecko: crypto, no API key needed
        registry.register(Box::new(CoinGeckoProvider::new(&settings.currency)));

        // metals.dev: precious metals, only with a key
        if let Some(key) = settings.api_keys.get("metals_dev") {
            registry.register(Box::new(MetalsDevProvider::new(key.clone(), &settings.currency)));
        }

        registry
    }

    pub fn register(&mut self, provider: Box<dyn SpotPriceProvider>) {
        self.providers.push(provider);
    }

    /// First provider that prices the given class.
    pub fn get_provider_for(&self, asset_class: &AssetClass) -> Option<&dyn SpotPriceProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_asset_classes().contains(asset_class))
            .map(|p| p.as_ref())
    }

    /// Every provider for the class, primary first.
    pub fn get_providers_for(&self, asset_class: &AssetClass) -> Vec<&dyn SpotPriceProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_asset_classes().contains(asset_class))
            .map(|p| p.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
