//! Configuration module for the signal relay.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for all relay components.
//!
//! # Usage
//!
//! ```rust,ignore
//! use signal_relay::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! // Access configuration values
//! println!("webhook: {}", config.server.webhook_path);
//! ```

mod exchange;
mod execution;
mod observability;
mod security;
mod server;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::protection::TpSlMode;
use crate::infrastructure::http::IpAllowlist;

pub use exchange::{ExchangeConfig, RetrySettings};
pub use execution::{BackoffKind, ExecutionConfig, PollConfig, ProtectionConfig};
pub use observability::ObservabilityConfig;
pub use security::SecurityConfig;
pub use server::ServerConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Webhook security.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Venue connection.
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Execution profile.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Source-IP allowlist built from the security section.
    pub fn allowlist(&self) -> Result<IpAllowlist, ConfigError> {
        IpAllowlist::new(
            &self.security.allowed_ips,
            self.security.trust_forwarded_for,
        )
        .map_err(|e| ConfigError::ValidationError(format!("security.allowed_ips: {e}")))
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    // Read the config file
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    // Match ${VAR} or ${VAR:-default} patterns
    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let full_match = full_match.as_str();
        let var_name = var_match.as_str();
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match, &value);
    }

    result
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server
    if !config.server.webhook_path.starts_with('/') {
        return Err(invalid("server.webhook_path must start with '/'"));
    }
    if config.server.request_timeout_ms == 0 {
        return Err(invalid("server.request_timeout_ms must be positive"));
    }

    // Security
    if config.security.shared_secret.trim().is_empty() {
        return Err(invalid("security.shared_secret must be set"));
    }
    config.allowlist()?;

    // Exchange
    if config.exchange.parsed_environment().is_none() {
        return Err(invalid(format!(
            "exchange.environment must be one of: [\"TESTNET\", \"MAINNET\"], got '{}'",
            config.exchange.environment
        )));
    }
    if config.exchange.api_key.is_empty() || config.exchange.api_secret.is_empty() {
        return Err(invalid(
            "exchange.api_key and exchange.api_secret must be set",
        ));
    }
    if config.exchange.retry.max_attempts == 0 {
        return Err(invalid("exchange.retry.max_attempts must be at least 1"));
    }

    // Execution
    let execution = &config.execution;
    if execution.default_quantity <= Decimal::ZERO {
        return Err(invalid("execution.default_quantity must be positive"));
    }
    if execution.default_leverage <= Decimal::ZERO {
        return Err(invalid("execution.default_leverage must be positive"));
    }
    if execution.poll.max_attempts == 0 {
        return Err(invalid("execution.poll.max_attempts must be at least 1"));
    }

    let protection = &execution.protection;
    for (name, value) in [
        ("tp_percent", protection.tp_percent),
        ("sl_percent", protection.sl_percent),
        ("limit_slippage_percent", Some(protection.limit_slippage_percent)),
    ] {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(invalid(format!(
                "execution.protection.{name} must not be negative"
            )));
        }
    }
    if protection.limit_orders && protection.tpsl_mode == TpSlMode::Full {
        return Err(invalid(
            "execution.protection.limit_orders requires tpsl_mode: Partial",
        ));
    }

    Ok(())
}
