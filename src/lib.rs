//! Live market-price suffixes for generated text.
//!
//! ```no_run
//! # async fn demo() {
//! if let Some(suffix) = pricetag::suffix_for("btc", None).await {
//!     println!("Ship it! {suffix}");
//! }
//! # }
//! ```

use std::sync::OnceLock;

pub mod config;
pub mod duration;
pub mod format;
pub mod pricing;

pub use config::PricingConfig;
pub use pricing::PriceSuffixService;

static DEFAULT_SERVICE: OnceLock<PriceSuffixService> = OnceLock::new();

/// Price suffix for `asset_key` using the process-wide default service.
///
/// The service is configured from the environment on first call and reused
/// afterwards. Returns `None` whenever no price can be produced.
pub async fn suffix_for(asset_key: &str, currency: Option<&str>) -> Option<String> {
    DEFAULT_SERVICE
        .get_or_init(|| PriceSuffixService::new(&PricingConfig::from_env()))
        .suffix_for(asset_key, currency)
        .await
}
