//! Bybit adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Environment for the Bybit API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BybitEnvironment {
    /// Testnet (simulated funds).
    #[default]
    Testnet,
    /// Mainnet (real money).
    Mainnet,
}

impl BybitEnvironment {
    /// Get the base URL for the REST API.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Testnet => "https://api-testnet.bybit.com",
            Self::Mainnet => "https://api.bybit.com",
        }
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Mainnet)
    }
}

impl std::fmt::Display for BybitEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Testnet => write!(f, "TESTNET"),
            Self::Mainnet => write!(f, "MAINNET"),
        }
    }
}

/// Configuration for the Bybit gateway adapter.
#[derive(Debug, Clone)]
pub struct BybitConfig {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Trading environment.
    pub environment: BybitEnvironment,
    /// Overrides the environment URL (proxies, tests).
    pub base_url: Option<String>,
    /// Product category, `linear` for USDT perpetuals.
    pub category: String,
    /// Validity window the venue allows for a signed request.
    pub recv_window: Duration,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy for idempotent reads.
    pub retry: RetryConfig,
}

impl BybitConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(api_key: String, api_secret: String, environment: BybitEnvironment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
            base_url: None,
            category: "linear".to_string(),
            recv_window: Duration::from_millis(5000),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Point the client at a different host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the product category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the receive window.
    #[must_use]
    pub const fn with_recv_window(mut self, recv_window: Duration) -> Self {
        self.recv_window = recv_window;
        self
    }

    /// Get the REST base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map_or(self.environment.base_url(), |url| url.trim_end_matches('/'))
    }
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn testnet_is_default() {
        let env = BybitEnvironment::default();
        assert_eq!(env, BybitEnvironment::Testnet);
        assert!(env.base_url().contains("testnet"));
        assert!(!env.is_live());
    }

    #[test]
    fn mainnet_url() {
        let env = BybitEnvironment::Mainnet;
        assert_eq!(env.base_url(), "https://api.bybit.com");
        assert!(env.is_live());
    }

    #[test]
    fn environment_display() {
        assert_eq!(BybitEnvironment::Testnet.to_string(), "TESTNET");
        assert_eq!(BybitEnvironment::Mainnet.to_string(), "MAINNET");
    }

    #[test]
    fn environment_deserializes_uppercase() {
        let env: BybitEnvironment = serde_json::from_str("\"MAINNET\"").unwrap();
        assert_eq!(env, BybitEnvironment::Mainnet);
    }

    #[test]
    fn config_defaults() {
        let config = BybitConfig::new(
            "key".to_string(),
            "secret".to_string(),
            BybitEnvironment::Testnet,
        );
        assert_eq!(config.category, "linear");
        assert_eq!(config.recv_window, Duration::from_millis(5000));
        assert_eq!(config.base_url(), "https://api-testnet.bybit.com");
    }

    #[test]
    fn base_url_override_trims_slash() {
        let config = BybitConfig::new(
            "key".to_string(),
            "secret".to_string(),
            BybitEnvironment::Mainnet,
        )
        .with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn retry_config_default() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_backoff, Duration::from_millis(200));
        assert_eq!(retry.multiplier, 2.0);
    }
}
