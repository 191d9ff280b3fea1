//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default so the binary also runs with no config
//! file at all.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::pricing::PriceTable;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub account: AccountConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AccountConfig {
    pub name: String,
    pub currency: String,
    /// When set, the binary opens the account at startup instead of
    /// waiting for a `create` command.
    pub initial_deposit: Option<Decimal>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        AccountConfig {
            name: "SIM-001".to_string(),
            currency: "USD".to_string(),
            initial_deposit: None,
        }
    }
}

/// Optional symbol → unit price table replacing the builtin one.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PricingConfig {
    pub prices: HashMap<String, Decimal>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does
    /// not exist. A file that exists but fails to parse is still an
    /// error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(AppConfig::default())
        }
    }

    /// The price table to run with: the configured one when present,
    /// otherwise the builtin table.
    pub fn price_table(&self) -> PriceTable {
        if self.pricing.prices.is_empty() {
            PriceTable::default()
        } else {
            PriceTable::new(self.pricing.prices.clone())
        }
    }
}
