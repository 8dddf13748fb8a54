use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which upstream strategy prices an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// CoinGecko-style `simple/price` exchange-rate API
    ExchangeRate,
    /// goldprice.org metals feed (USD only)
    Metal,
}

/// Static description of a priceable asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Short key supplied by callers (e.g. "btc").
    pub key: String,
    /// Identifier the upstream API expects. For metals this is the price
    /// field in the feed payload (e.g. "xauPrice").
    pub remote_id: String,
    /// Label shown in the suffix (e.g. "BTC").
    pub display_label: String,
    pub provider: ProviderKind,
}

impl AssetDescriptor {
    pub fn new(
        key: impl Into<String>,
        remote_id: impl Into<String>,
        display_label: impl Into<String>,
        provider: ProviderKind,
    ) -> Self {
        Self {
            key: key.into().to_lowercase(),
            remote_id: remote_id.into(),
            display_label: display_label.into(),
            provider,
        }
    }

    pub fn exchange_rate(key: &str, remote_id: &str, display_label: &str) -> Self {
        Self::new(key, remote_id, display_label, ProviderKind::ExchangeRate)
    }

    pub fn metal(key: &str, price_field: &str, display_label: &str) -> Self {
        Self::new(key, price_field, display_label, ProviderKind::Metal)
    }
}

/// A price observed for one asset at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub asset_key: String,
    pub amount: Decimal,
    /// Uppercase ISO code (e.g. "USD").
    pub currency: String,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    pub fn new(
        asset_key: impl Into<String>,
        amount: Decimal,
        currency: &str,
        source: impl Into<String>,
    ) -> Self {
        Self {
            asset_key: asset_key.into(),
            amount,
            currency: currency.trim().to_uppercase(),
            source: source.into(),
            fetched_at: Utc::now(),
        }
    }
}
