//! Webhook authentication and source-IP filtering.

use serde::{Deserialize, Serialize};

/// Security configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared secret every signal must carry.
    #[serde(default)]
    pub shared_secret: String,
    /// Peer addresses allowed to call the webhook. Empty disables the check.
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    /// Use the first `X-Forwarded-For` hop as the caller address.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}
