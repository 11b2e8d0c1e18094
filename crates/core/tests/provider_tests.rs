// ═══════════════════════════════════════════════════════════════════
// Provider Tests — Registry, CoinGecko, metals.dev (against a mock server)
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vault_core::errors::CoreError;
use vault_core::models::holding::AssetClass;
use vault_core::models::quote::SpotQuote;
use vault_core::models::settings::Settings;
use vault_core::providers::coingecko::CoinGeckoProvider;
use vault_core::providers::metals_dev::MetalsDevProvider;
use vault_core::providers::registry::PriceProviderRegistry;
use vault_core::providers::traits::SpotPriceProvider;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A mock provider that supports only the specified asset classes.
struct MockProvider {
    name: String,
    classes: Vec<AssetClass>,
}

impl MockProvider {
    fn new(name: &str, classes: Vec<AssetClass>) -> Self {
        Self {
            name: name.to_string(),
            classes,
        }
    }
}

#[async_trait]
impl SpotPriceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        self.classes.clone()
    }

    async fn get_spot_price(&self, identifier: &str) -> Result<SpotQuote, CoreError> {
        Ok(SpotQuote::new(identifier, 100.0, Utc::now()))
    }
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn empty_registry() {
        let registry = PriceProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get_provider_for(&AssetClass::Crypto).is_none());
    }

    #[test]
    fn routes_by_asset_class() {
        let mut registry = PriceProviderRegistry::default();
        registry.register(Box::new(MockProvider::new("Coins", vec![AssetClass::Crypto])));
        registry.register(Box::new(MockProvider::new("Metals", vec![AssetClass::PreciousMetal])));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_provider_for(&AssetClass::Crypto).unwrap().name(), "Coins");
        assert_eq!(
            registry.get_provider_for(&AssetClass::PreciousMetal).unwrap().name(),
            "Metals"
        );
        assert!(registry.get_provider_for(&AssetClass::FixedDeposit).is_none());
    }

    #[test]
    fn first_registered_is_primary() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("Primary", vec![AssetClass::Crypto])));
        registry.register(Box::new(MockProvider::new(
            "Everything",
            vec![AssetClass::Crypto, AssetClass::PreciousMetal],
        )));

        let names: Vec<&str> = registry
            .get_providers_for(&AssetClass::Crypto)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["Primary", "Everything"]);
        assert_eq!(
            registry.get_provider_for(&AssetClass::PreciousMetal).unwrap().name(),
            "Everything"
        );
    }

    #[test]
    fn defaults_without_keys_cover_crypto_only() {
        let registry = PriceProviderRegistry::new_with_defaults(&Settings::default());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_provider_for(&AssetClass::Crypto).unwrap().name(), "CoinGecko");
        assert!(registry.get_provider_for(&AssetClass::PreciousMetal).is_none());
    }

    #[test]
    fn metals_key_adds_metal_provider() {
        let mut settings = Settings::default();
        settings.api_keys.insert("metals_dev".into(), "key".into());
        let registry = PriceProviderRegistry::new_with_defaults(&settings);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get_provider_for(&AssetClass::PreciousMetal).unwrap().name(),
            "metals.dev"
        );
    }

    #[tokio::test]
    async fn default_batch_loops_single_lookups() {
        let provider = MockProvider::new("Coins", vec![AssetClass::Crypto]);
        let quotes = provider.get_spot_prices(&ids(&["BTC", "ETH"])).await.unwrap();
        let got: Vec<&str> = quotes.iter().map(|q| q.identifier.as_str()).collect();
        assert_eq!(got, vec!["BTC", "ETH"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CoinGecko
// ═══════════════════════════════════════════════════════════════════

mod coingecko {
    use super::*;

    #[test]
    fn metadata() {
        let provider = CoinGeckoProvider::new("INR");
        assert_eq!(provider.name(), "CoinGecko");
        assert_eq!(provider.supported_asset_classes(), vec![AssetClass::Crypto]);
    }

    #[test]
    fn resolves_common_tickers() {
        let provider = CoinGeckoProvider::new("INR");
        assert_eq!(provider.resolve_id("BTC"), "bitcoin");
        assert_eq!(provider.resolve_id("eth"), "ethereum");
        assert_eq!(provider.resolve_id(" matic "), "matic-network");
        assert_eq!(provider.resolve_id("AVAX"), "avalanche-2");
    }

    #[test]
    fn unknown_ticker_passes_through_lowercased() {
        let provider = CoinGeckoProvider::new("INR");
        assert_eq!(provider.resolve_id("PEPE"), "pepe");
    }

    #[tokio::test]
    async fn prices_batch_in_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin,ethereum"))
            .and(query_param("vs_currencies", "inr"))
            .and(query_param("include_24hr_change", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bitcoin": { "inr": 4_000_000.0, "inr_24h_change": 1.5 },
                "ethereum": { "inr": 250_000 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri(), "INR");
        let quotes = provider.get_spot_prices(&ids(&["btc", "ETH"])).await.unwrap();

        let by_id: HashMap<&str, &SpotQuote> =
            quotes.iter().map(|q| (q.identifier.as_str(), q)).collect();
        assert_eq!(by_id["BTC"].price_per_unit, 4_000_000.0);
        assert_eq!(by_id["BTC"].change_24h_percent, 1.5);
        assert_eq!(by_id["ETH"].price_per_unit, 250_000.0);
        assert_eq!(by_id["ETH"].change_24h_percent, 0.0);
    }

    #[tokio::test]
    async fn single_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "solana"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "solana": { "usd": 142.3 } })),
            )
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri(), "usd");
        let quote = provider.get_spot_price("SOL").await.unwrap();
        assert_eq!(quote.identifier, "SOL");
        assert_eq!(quote.price_per_unit, 142.3);
    }

    #[tokio::test]
    async fn empty_request_skips_network() {
        let server = MockServer::start().await;
        let provider = CoinGeckoProvider::with_base_url(server.uri(), "INR");
        assert!(provider.get_spot_prices(&[]).await.unwrap().is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri(), "INR");
        let err = provider.get_spot_price("BTC").await.unwrap_err();
        assert!(matches!(err, CoreError::QuoteProviderUnavailable { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn rate_limit_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri(), "INR");
        assert!(provider.get_spot_price("BTC").await.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn client_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri(), "INR");
        let err = provider.get_spot_price("BTC").await.unwrap_err();
        match &err {
            CoreError::Api { provider, message } => {
                assert_eq!(provider, "CoinGecko");
                assert!(message.contains("404"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn missing_coin_fails_whole_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "bitcoin": { "inr": 4_000_000.0 } })),
            )
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri(), "INR");
        let err = provider.get_spot_prices(&ids(&["BTC", "PEPE"])).await.unwrap_err();
        assert!(matches!(err, CoreError::Api { ref message, .. } if message.contains("PEPE")));
    }

    #[tokio::test]
    async fn malformed_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri(), "INR");
        assert!(matches!(
            provider.get_spot_price("BTC").await,
            Err(CoreError::Api { .. })
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// metals.dev
// ═══════════════════════════════════════════════════════════════════

mod metals_dev {
    use super::*;

    fn provider(server: &MockServer) -> MetalsDevProvider {
        MetalsDevProvider::with_base_url(server.uri(), "secret".to_string(), "inr")
    }

    #[test]
    fn metadata() {
        let provider = MetalsDevProvider::new("k".into(), "INR");
        assert_eq!(provider.name(), "metals.dev");
        assert_eq!(provider.supported_asset_classes(), vec![AssetClass::PreciousMetal]);
    }

    #[tokio::test]
    async fn prices_per_gram() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("api_key", "secret"))
            .and(query_param("currency", "INR"))
            .and(query_param("unit", "g"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "currency": "INR",
                "unit": "g",
                "metals": { "gold": 6850.5, "silver": 82.1, "platinum": 2710.0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let quotes = provider(&server)
            .get_spot_prices(&ids(&["Gold", "silver"]))
            .await
            .unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].identifier, "gold");
        assert_eq!(quotes[0].price_per_unit, 6850.5);
        assert_eq!(quotes[1].identifier, "silver");
        assert_eq!(quotes[1].price_per_unit, 82.1);
    }

    #[tokio::test]
    async fn failure_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failure",
                "error_code": 1101,
                "error_message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        let err = provider(&server).get_spot_price("gold").await.unwrap_err();
        assert!(matches!(err, CoreError::Api { ref message, .. } if message == "Invalid API key"));
    }

    #[tokio::test]
    async fn metal_missing_from_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "success", "metals": { "gold": 6850.0 } })),
            )
            .mount(&server)
            .await;

        assert!(provider(&server).get_spot_price("palladium").await.is_err());
    }

    #[tokio::test]
    async fn unknown_metal_rejected_before_request() {
        let server = MockServer::start().await;
        let err = provider(&server).get_spot_price("copper").await.unwrap_err();
        assert!(matches!(err, CoreError::Api { ref message, .. } if message.contains("copper")));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert!(provider(&server).get_spot_price("gold").await.unwrap_err().is_transient());
    }
}
