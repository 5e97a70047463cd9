//! Observability configuration.

use serde::{Deserialize, Serialize};

/// Observability configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Port for the Prometheus scrape endpoint. Metrics are off when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}
