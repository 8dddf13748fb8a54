use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::duration::{deserialize_timeout, serialize_timeout};

/// Environment variable controlling TLS verification.
///
/// Verification stays disabled unless this is set to exactly `0`.
pub const INSECURE_SSL_ENV: &str = "PRICETAG_INSECURE_SSL";

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
pub const GOLDPRICE_API_BASE: &str = "https://data-asg.goldprice.org";

fn default_currency() -> String {
    "USD".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_curl_fallback() -> bool {
    true
}

fn default_curl_program() -> String {
    "curl".to_string()
}

fn default_coingecko_base_url() -> String {
    COINGECKO_API_BASE.to_string()
}

fn default_goldprice_base_url() -> String {
    GOLDPRICE_API_BASE.to_string()
}

/// Pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Currency used when the caller doesn't ask for one (e.g., "USD").
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Verify TLS certificates against the system trust store.
    ///
    /// Off by default for environments with broken certificate chains.
    pub verify_tls: bool,

    /// Retry through an external `curl` when the HTTP client returns nothing.
    #[serde(default = "default_curl_fallback")]
    pub curl_fallback: bool,

    /// Program used for the fallback transport.
    #[serde(default = "default_curl_program")]
    pub curl_program: String,

    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "deserialize_timeout",
        serialize_with = "serialize_timeout"
    )]
    pub connect_timeout: Duration,

    #[serde(
        default = "default_read_timeout",
        deserialize_with = "deserialize_timeout",
        serialize_with = "serialize_timeout"
    )]
    pub read_timeout: Duration,

    /// Base URL of the exchange-rate API.
    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,

    /// Base URL of the metals API.
    #[serde(default = "default_goldprice_base_url")]
    pub goldprice_base_url: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            verify_tls: false,
            curl_fallback: default_curl_fallback(),
            curl_program: default_curl_program(),
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            coingecko_base_url: default_coingecko_base_url(),
            goldprice_base_url: default_goldprice_base_url(),
        }
    }
}

impl PricingConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: PricingConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default config with the process environment applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `PRICETAG_INSECURE_SSL` on top of this config.
    ///
    /// An unset variable leaves `verify_tls` untouched.
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(INSECURE_SSL_ENV).ok();
        self.with_insecure_ssl_value(value.as_deref())
    }

    fn with_insecure_ssl_value(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.verify_tls = value.trim() == "0";
        }
        self
    }

    /// Deadline for a single transport attempt.
    pub fn request_timeout(&self) -> Duration {
        self.connect_timeout + self.read_timeout
    }
}
