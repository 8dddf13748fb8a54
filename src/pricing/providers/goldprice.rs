//! goldprice.org metals resolver.
//!
//! `/dbXRates/{CURRENCY}` returns spot metal prices as:
//!
//! ```text
//! {"items": [{"curr": "USD", "xauPrice": 2350.125, "xagPrice": 29.87}]}
//! ```
//!
//! Only USD is supported.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use super::parse_price;
use crate::config::GOLDPRICE_API_BASE;
use crate::pricing::models::{AssetDescriptor, PriceQuote};
use crate::pricing::transport::Fetcher;

/// The only currency the metals feed is queried in.
pub const METAL_CURRENCY: &str = "USD";

/// Resolves metal prices through goldprice.org.
#[derive(Clone)]
pub struct GoldPriceResolver {
    fetcher: Fetcher,
    base_url: String,
}

impl GoldPriceResolver {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            base_url: GOLDPRICE_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn supports_currency(currency: &str) -> bool {
        currency.trim().eq_ignore_ascii_case(METAL_CURRENCY)
    }

    fn rates_url(&self, currency: &str) -> String {
        format!(
            "{}/dbXRates/{}",
            self.base_url,
            urlencoding::encode(&currency.trim().to_uppercase())
        )
    }

    /// Fetch the current price of `asset`. Non-USD currencies return `None`
    /// without touching the network.
    pub async fn resolve(&self, asset: &AssetDescriptor, currency: &str) -> Option<PriceQuote> {
        if !Self::supports_currency(currency) {
            debug!(asset = %asset.key, currency, "metals feed only quotes USD");
            return None;
        }

        let body = self.fetcher.get(&self.rates_url(currency)).await?;

        let Some(amount) = extract_price(&body, &asset.remote_id) else {
            debug!(asset = %asset.key, field = %asset.remote_id, "no price in metals response");
            return None;
        };

        Some(PriceQuote::new(&asset.key, amount, currency, self.name()))
    }

    pub fn name(&self) -> &str {
        "goldprice"
    }
}

/// Pull `body.items[0][field]` out of a `dbXRates` response.
fn extract_price(body: &str, field: &str) -> Option<Decimal> {
    let data: Value = serde_json::from_str(body).ok()?;
    let first = data.get("items")?.as_array()?.first()?;
    parse_price(first.get(field)?)
}
