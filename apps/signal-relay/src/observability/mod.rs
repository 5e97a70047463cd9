//! Observability module for metrics.
//!
//! Prometheus counters and histograms for the signal pipeline. Tracing
//! subscriber setup lives in [`crate::telemetry`].

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_gateway_call, record_position_poll,
    record_signal_outcome, record_signal_received, record_unprotected_position,
};
