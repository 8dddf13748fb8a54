//! CoinGecko exchange-rate resolver.
//!
//! Uses the free `/simple/price` endpoint, which returns the current price of
//! one or more coins keyed by coin id and then by lowercase currency code:
//!
//! ```text
//! {"bitcoin": {"usd": 65000.4}}
//! ```

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use super::parse_price;
use crate::config::COINGECKO_API_BASE;
use crate::pricing::models::{AssetDescriptor, PriceQuote};
use crate::pricing::transport::Fetcher;

/// Resolves crypto prices through CoinGecko.
#[derive(Clone)]
pub struct CoinGeckoResolver {
    fetcher: Fetcher,
    base_url: String,
}

impl CoinGeckoResolver {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            base_url: COINGECKO_API_BASE.to_string(),
        }
    }

    /// Points the resolver at a different API root (mock servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn price_url(&self, coin_id: &str, currency: &str) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            urlencoding::encode(coin_id),
            urlencoding::encode(&currency.to_lowercase())
        )
    }

    /// Fetch the current price of `asset` in `currency`.
    pub async fn resolve(&self, asset: &AssetDescriptor, currency: &str) -> Option<PriceQuote> {
        let url = self.price_url(&asset.remote_id, currency);
        let body = self.fetcher.get(&url).await?;

        let Some(amount) = extract_price(&body, &asset.remote_id, currency) else {
            debug!(asset = %asset.key, currency, "no price in CoinGecko response");
            return None;
        };

        Some(PriceQuote::new(&asset.key, amount, currency, self.name()))
    }

    pub fn name(&self) -> &str {
        "coingecko"
    }
}

/// Pull `body[coin_id][currency]` out of a `/simple/price` response.
///
/// The coin id is matched exactly first, then ignoring ASCII case.
fn extract_price(body: &str, coin_id: &str, currency: &str) -> Option<Decimal> {
    let data: Map<String, Value> = serde_json::from_str(body).ok()?;

    let coin = data.get(coin_id).or_else(|| {
        data.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(coin_id))
            .map(|(_, value)| value)
    })?;

    let prices = coin.as_object()?;
    parse_price(prices.get(&currency.to_lowercase())?)
}
