//! HTTP server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// HTTP port for the webhook, `/` and `/health`.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Path the webhook is served on.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// How long a caller waits for an execution before getting a 500.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    /// Request timeout as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// `address:port` to listen on.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            webhook_path: default_webhook_path(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

const fn default_http_port() -> u16 {
    8000
}

fn default_webhook_path() -> String {
    "/tradingview-webhook".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    25_000
}
