use std::sync::Arc;

use tracing::debug;

use super::models::{AssetDescriptor, PriceQuote, ProviderKind};
use super::providers::{CoinGeckoResolver, GoldPriceResolver};
use super::registry::AssetRegistry;
use super::transport::{Fetcher, HttpTransport};
use super::transports::{CurlTransport, ReqwestTransport};
use crate::config::PricingConfig;
use crate::format::format_suffix;

/// Turns an asset key into a formatted price suffix.
///
/// Every failure (unknown asset, unsupported currency, network, parse)
/// comes back as `None`. Holds no mutable state, so one instance can be
/// shared across tasks.
#[derive(Clone)]
pub struct PriceSuffixService {
    registry: AssetRegistry,
    coingecko: CoinGeckoResolver,
    metals: GoldPriceResolver,
    default_currency: String,
}

impl PriceSuffixService {
    /// Build the service with the reqwest transport and, when enabled, the
    /// curl fallback.
    pub fn new(config: &PricingConfig) -> Self {
        let primary = Arc::new(ReqwestTransport::new(
            config.connect_timeout,
            config.read_timeout,
        ));
        let mut fetcher = Fetcher::new(primary, config.verify_tls, config.request_timeout());
        if config.curl_fallback {
            fetcher = fetcher.with_fallback(Arc::new(CurlTransport::with_program(
                config.curl_program.clone(),
            )));
        }
        Self::with_fetcher(config, fetcher)
    }

    /// Build the service around an existing fetcher.
    pub fn with_fetcher(config: &PricingConfig, fetcher: Fetcher) -> Self {
        Self {
            registry: AssetRegistry::builtin(),
            coingecko: CoinGeckoResolver::new(fetcher.clone())
                .with_base_url(config.coingecko_base_url.clone()),
            metals: GoldPriceResolver::new(fetcher).with_base_url(config.goldprice_base_url.clone()),
            default_currency: config.default_currency.trim().to_uppercase(),
        }
    }

    /// Build the service around a single transport with no fallback.
    pub fn with_transport(config: &PricingConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let fetcher = Fetcher::new(transport, config.verify_tls, config.request_timeout());
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_registry(mut self, registry: AssetRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Current price of `asset_key`, in `currency` or the default currency.
    pub async fn quote(&self, asset_key: &str, currency: Option<&str>) -> Option<PriceQuote> {
        let asset = self.lookup(asset_key)?;
        self.resolve(asset, currency).await
    }

    /// Suffix such as `(BTC: $65,000.40)`, or `None` when no price is available.
    pub async fn suffix_for(&self, asset_key: &str, currency: Option<&str>) -> Option<String> {
        let asset = self.lookup(asset_key)?;
        let quote = self.resolve(asset, currency).await?;
        Some(format_suffix(quote.amount, &quote.currency, &asset.display_label))
    }

    fn lookup(&self, asset_key: &str) -> Option<&AssetDescriptor> {
        let asset = self.registry.lookup(asset_key);
        if asset.is_none() {
            debug!(asset = asset_key, "unknown asset");
        }
        asset
    }

    async fn resolve(&self, asset: &AssetDescriptor, currency: Option<&str>) -> Option<PriceQuote> {
        let currency = self.resolve_currency(currency);
        match asset.provider {
            ProviderKind::ExchangeRate => self.coingecko.resolve(asset, &currency).await,
            ProviderKind::Metal => self.metals.resolve(asset, &currency).await,
        }
    }

    fn resolve_currency(&self, currency: Option<&str>) -> String {
        match currency.map(str::trim) {
            Some(code) if !code.is_empty() => code.to_uppercase(),
            _ => self.default_currency.clone(),
        }
    }
}
