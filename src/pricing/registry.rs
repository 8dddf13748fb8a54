//! Asset registry.
//!
//! Maps the short keys callers use to the provider and remote identifiers
//! needed to price them.

use std::collections::HashSet;

use super::models::AssetDescriptor;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate asset key {0:?}")]
    DuplicateKey(String),
    #[error("asset key must not be empty")]
    EmptyKey,
}

/// Immutable set of known assets.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    entries: Vec<AssetDescriptor>,
}

impl AssetRegistry {
    /// Build a registry, rejecting empty or duplicate keys.
    pub fn new(entries: Vec<AssetDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.key.trim().is_empty() {
                return Err(RegistryError::EmptyKey);
            }
            if !seen.insert(entry.key.clone()) {
                return Err(RegistryError::DuplicateKey(entry.key.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The assets shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                AssetDescriptor::exchange_rate("btc", "bitcoin", "BTC"),
                AssetDescriptor::exchange_rate("eth", "ethereum", "ETH"),
                AssetDescriptor::metal("xau", "xauPrice", "XAU"),
                AssetDescriptor::metal("xag", "xagPrice", "XAG"),
            ],
        }
    }

    /// Look up an asset by key. Keys are matched case-insensitively.
    pub fn lookup(&self, key: &str) -> Option<&AssetDescriptor> {
        let key = key.trim().to_lowercase();
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
