use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SignalError;
use crate::indicators::IndicatorConfig;
use crate::strategy::ClassifierConfig;

const DEFAULT_CONFIG_NAME: &str = "signalbot";
const ENV_PREFIX: &str = "SIGNALBOT";

/// Where prices come from and how the client talks to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub coin_id: String,
    pub vs_currency: String,
    /// Days of history requested from market_chart
    pub days: u32,
    /// Sampling interval passed to market_chart ("daily" or empty for auto)
    pub interval: String,
    pub api_base_url: String,
    /// Optional CoinGecko demo API key
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Base delay, doubled on each retry
    pub retry_backoff_ms: u64,
    pub rate_limit_per_minute: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            coin_id: "bitcoin".to_string(),
            vs_currency: "usd".to_string(),
            days: 100,
            interval: "daily".to_string(),
            api_base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
            timeout_secs: 30,
            max_retries: 3,
            retry_backoff_ms: 2000,
            rate_limit_per_minute: 30, // Demo API: 30 requests per minute
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_minutes: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
        }
    }
}

/// Application configuration
///
/// Layers, lowest priority first: built-in defaults, `signalbot.toml` (or the
/// file passed explicitly), then `SIGNALBOT__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub indicators: IndicatorConfig,
    pub classifier: ClassifierConfig,
    pub watch: WatchConfig,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let cfg: AppConfig = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        cfg.validate()?;

        tracing::debug!(
            coin = %cfg.market.coin_id,
            currency = %cfg.market.vs_currency,
            days = cfg.market.days,
            "Configuration loaded"
        );

        Ok(cfg)
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.indicators.validate()?;
        self.classifier.validate()?;

        if self.market.coin_id.trim().is_empty() {
            return Err(SignalError::invalid_config("market.coin_id is empty"));
        }
        if self.market.vs_currency.trim().is_empty() {
            return Err(SignalError::invalid_config("market.vs_currency is empty"));
        }
        if self.market.days == 0 {
            return Err(SignalError::invalid_config("market.days must be > 0"));
        }
        if self.market.max_retries == 0 {
            return Err(SignalError::invalid_config("market.max_retries must be > 0"));
        }
        if self.market.rate_limit_per_minute == 0 {
            return Err(SignalError::invalid_config(
                "market.rate_limit_per_minute must be > 0",
            ));
        }
        if self.watch.interval_minutes == 0 {
            return Err(SignalError::invalid_config("watch.interval_minutes must be > 0"));
        }

        Ok(())
    }
}
