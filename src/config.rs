use std::{path::PathBuf, time::Duration};

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::{
    dispatch::{DispatchSettings, RetryAfterUnit},
    retry::RetryConfig,
};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub webhook_url: String,
    pub api_url: String,
    pub product_sku: String,

    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,

    #[serde(default)]
    pub retry_after_unit: RetryAfterUnit,
    /// Zero disables the ceiling.
    #[serde(default = "default_rate_limit_max_retries")]
    pub rate_limit_max_retries: u32,
    pub rate_limit_max_wait_ms: Option<u64>,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: u64,

    pub snapshot_path: Option<PathBuf>,

    #[serde(default)]
    pub log_json: bool,
}

fn default_http_timeout_seconds() -> u64 {
    10
}

fn default_rate_limit_max_retries() -> u32 {
    10
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_initial_retry_delay_ms() -> u64 {
    500
}

fn default_max_retry_delay_ms() -> u64 {
    5000
}

fn default_retry_backoff_multiplier() -> u64 {
    2
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Reads the config from `(NAME, value)` pairs, as found in the environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config with defaults for everything but the three required keys.
    pub fn new(webhook_url: &str, api_url: &str, product_sku: &str) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            api_url: api_url.to_string(),
            product_sku: product_sku.to_string(),
            http_timeout_seconds: default_http_timeout_seconds(),
            retry_after_unit: RetryAfterUnit::default(),
            rate_limit_max_retries: default_rate_limit_max_retries(),
            rate_limit_max_wait_ms: None,
            max_retry_attempts: default_max_retry_attempts(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            snapshot_path: None,
            log_json: false,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.webhook_url.trim().is_empty() {
            return Err(anyhow!("WEBHOOK_URL cannot be empty"));
        }
        if self.api_url.trim().is_empty() {
            return Err(anyhow!("API_URL cannot be empty"));
        }
        if self.product_sku.trim().is_empty() {
            return Err(anyhow!("PRODUCT_SKU cannot be empty"));
        }
        if self.max_retry_attempts == 0 {
            return Err(anyhow!("MAX_RETRY_ATTEMPTS must be at least 1"));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retry_attempts,
            initial_delay_ms: self.initial_retry_delay_ms,
            max_delay_ms: self.max_retry_delay_ms,
            backoff_multiplier: self.retry_backoff_multiplier,
        }
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            retry_after_unit: self.retry_after_unit,
            max_rate_limit_retries: (self.rate_limit_max_retries > 0)
                .then_some(self.rate_limit_max_retries),
            max_total_wait: self.rate_limit_max_wait_ms.map(Duration::from_millis),
        }
    }
}
