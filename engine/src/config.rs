//! Configuration management for the Uniform Stock Management engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with USM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Current environment (development, production)
    pub environment: String,

    /// Stock threshold configuration
    pub stock: StockConfig,

    /// Document store configuration
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StockConfig {
    /// Reorder level applied when variant creation supplies none
    pub default_reorder_level: u32,

    /// Alert threshold for batch sizes with no explicit configuration
    pub default_batch_threshold: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Bounded attempt count for optimistic transactions
    pub max_txn_attempts: u32,
}

impl EngineConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("USM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("stock.default_reorder_level", 5)?
            .set_default("stock.default_batch_threshold", 10)?
            .set_default("store.max_txn_attempts", 5)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (USM_ prefix)
            .add_source(
                Environment::with_prefix("USM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            stock: StockConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            default_reorder_level: 5,
            default_batch_threshold: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_txn_attempts: 5,
        }
    }
}
