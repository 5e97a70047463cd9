//! Venue connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::exchange::bybit::{BybitConfig, BybitEnvironment, RetryConfig};

/// Exchange configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// `TESTNET` or `MAINNET`.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Overrides the environment URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default)]
    pub api_secret: String,
    /// Product category.
    #[serde(default = "default_category")]
    pub category: String,
    /// Signed request validity window.
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    /// HTTP timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry policy for reads.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            base_url: None,
            api_key: String::new(),
            api_secret: String::new(),
            category: default_category(),
            recv_window_ms: default_recv_window_ms(),
            timeout_ms: default_timeout_ms(),
            retry: RetrySettings::default(),
        }
    }
}

impl ExchangeConfig {
    /// Parsed environment, `None` when the name is unknown.
    #[must_use]
    pub fn parsed_environment(&self) -> Option<BybitEnvironment> {
        match self.environment.to_ascii_uppercase().as_str() {
            "TESTNET" => Some(BybitEnvironment::Testnet),
            "MAINNET" => Some(BybitEnvironment::Mainnet),
            _ => None,
        }
    }

    /// Build the adapter configuration.
    #[must_use]
    pub fn to_bybit_config(&self) -> BybitConfig {
        let mut config = BybitConfig::new(
            self.api_key.clone(),
            self.api_secret.clone(),
            self.parsed_environment().unwrap_or_default(),
        )
        .with_category(self.category.clone())
        .with_recv_window(Duration::from_millis(self.recv_window_ms))
        .with_timeout(Duration::from_millis(self.timeout_ms))
        .with_retry(self.retry.to_retry_config());

        if let Some(base_url) = self.base_url.as_deref().filter(|url| !url.is_empty()) {
            config = config.with_base_url(base_url);
        }
        config
    }
}

/// Retry settings as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Growth factor.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetrySettings {
    /// Convert to the adapter retry policy.
    #[must_use]
    pub const fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

fn default_environment() -> String {
    "TESTNET".to_string()
}

fn default_category() -> String {
    "linear".to_string()
}

const fn default_recv_window_ms() -> u64 {
    5000
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    200
}

const fn default_max_backoff_ms() -> u64 {
    5000
}

const fn default_multiplier() -> f64 {
    2.0
}
