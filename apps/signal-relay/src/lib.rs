// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Signal Relay - Rust Core Library
//!
//! Turns authenticated webhook trade signals into protected positions on a
//! derivatives venue.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure rules with no I/O
//!   - `shared`: instruments, sides, normalization
//!   - `signal`: raw payload parsing, authorization, normalization
//!   - `protection`: take-profit / stop-loss price derivation
//!   - `execution`: pipeline stages, outcome record
//!
//! - **Application**: Orchestration over the venue port
//!   - `ports`: `ExchangeGateway`
//!   - `services`: leverage configuration, entry placement, position
//!     confirmation, protection attachment
//!   - `use_cases`: `ExecuteSignalUseCase`
//!
//! - **Infrastructure**: Adapters
//!   - `exchange::bybit`: signed V5 REST client and gateway adapter
//!   - `http`: axum webhook endpoint and source-IP allowlist
//!
//! # Pipeline
//!
//! Validate → Leverage → Entry order → Confirm → Protection calc → Stop attach

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration with environment interpolation.
pub mod config;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber and OTLP export.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use domain::execution::{ExecutionResult, ExecutionStage, ExecutionStatus};
pub use domain::shared::{Instrument, InstrumentNormalizer, Side};
pub use domain::signal::{RawSignal, Signal, SignalAction, SignalRejection, SignalValidator};

pub use application::ports::{ExchangeGateway, GatewayError, GatewayErrorKind};
pub use application::use_cases::ExecuteSignalUseCase;

pub use config::{Config, ConfigError, load_config};
pub use infrastructure::exchange::bybit::{BybitConfig, BybitEnvironment, BybitGatewayAdapter};
pub use infrastructure::http::{AppState, RouterOptions, create_router};
