pub mod coingecko;
pub mod goldprice;

pub use coingecko::CoinGeckoResolver;
pub use goldprice::GoldPriceResolver;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Read a price from a JSON number or numeric string.
///
/// Numbers are converted from their JSON text rather than through `f64` so
/// the upstream digits survive (`2350.125` stays `2350.125`).
pub(crate) fn parse_price(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
