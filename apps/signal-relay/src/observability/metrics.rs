//! Prometheus metrics for the signal relay.
//!
//! Counters and histograms for inbound signals, venue calls, position
//! confirmation polling and positions left without protection.
//!
//! # Example
//!
//! ```ignore
//! use signal_relay::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_gateway_call("place_order", "ok", 0.120);
//! ```

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090)),
            // Venue round trips: 10ms to 10s
            latency_buckets: vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Signal Metrics
// ============================================================================

/// Record an inbound signal.
///
/// # Arguments
///
/// * `action` - Action as parsed (e.g., "open_long", "close") or "unsupported"
pub fn record_signal_received(action: &str) {
    counter!("signals_received_total", "action" => action.to_string()).increment(1);
}

/// Record the terminal outcome of a signal.
///
/// # Arguments
///
/// * `status` - "success", "ignored", "failed" or "rejected"
/// * `reason` - Abort or rejection reason, "none" on success
pub fn record_signal_outcome(status: &str, reason: &str) {
    counter!(
        "signal_outcomes_total",
        "status" => status.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a position left open without protective stops.
///
/// # Arguments
///
/// * `instrument` - Normalized instrument
pub fn record_unprotected_position(instrument: &str) {
    counter!(
        "unprotected_positions_total",
        "instrument" => instrument.to_string()
    )
    .increment(1);
}

/// Record how many polls position confirmation needed.
pub fn record_position_poll(attempts: u32) {
    histogram!("position_poll_attempts").record(f64::from(attempts));
}

// ============================================================================
// Gateway Metrics
// ============================================================================

/// Record a venue call.
///
/// # Arguments
///
/// * `operation` - Gateway operation (e.g., "set_leverage", "place_order")
/// * `outcome` - "ok" or the classified error kind
/// * `latency_seconds` - Round trip in seconds
pub fn record_gateway_call(operation: &str, outcome: &str, latency_seconds: f64) {
    counter!(
        "gateway_calls_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "gateway_call_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(latency_seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(!config.latency_buckets.is_empty());
    }

    #[test]
    fn test_config_with_addr() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = MetricsConfig::with_addr(addr);
        assert_eq!(config.listen_addr, addr);
    }

    #[test]
    fn test_recording_without_exporter_is_noop() {
        record_signal_received("open_long");
        record_signal_outcome("success", "none");
        record_gateway_call("place_order", "ok", 0.05);
        record_unprotected_position("BTCUSDT");
        record_position_poll(3);
    }
}
