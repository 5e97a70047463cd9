//! Signal Relay Binary
//!
//! Serves the webhook endpoint and relays each accepted signal to the venue.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin signal-relay
//! ```
//!
//! # Environment Variables
//!
//! - `SIGNAL_RELAY_CONFIG`: path to the YAML config (default: `config.yaml`)
//! - `BYBIT_API_KEY`, `BYBIT_API_SECRET`, `WEBHOOK_SECRET`: referenced from the
//!   sample config through `${VAR}` interpolation
//! - `RUST_LOG`: log filter (default: `signal_relay=info`)
//! - `OTEL_ENABLED`: export spans over OTLP when `true`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use signal_relay::config::{Config, load_config};
use signal_relay::domain::signal::SignalValidator;
use signal_relay::infrastructure::exchange::bybit::BybitGatewayAdapter;
use signal_relay::infrastructure::http::{AppState, RouterOptions, create_router};
use signal_relay::observability::{MetricsConfig, init_metrics};
use signal_relay::telemetry::init_telemetry;
use signal_relay::ExecuteSignalUseCase;
use tokio::net::TcpListener;
use tokio::signal;

/// Default config file path.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

type RelayUseCase = ExecuteSignalUseCase<BybitGatewayAdapter>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_ancestors();
    let _telemetry = init_telemetry();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting signal relay");

    let config_path =
        std::env::var("SIGNAL_RELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Some(&config_path))
        .with_context(|| format!("loading configuration from {config_path}"))?;
    log_config(&config);

    if let Some(port) = config.observability.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        init_metrics(&MetricsConfig::with_addr(addr)).context("starting metrics exporter")?;
        tracing::info!(%addr, "Prometheus metrics exporter listening");
    }

    let use_case = create_use_case(&config)?;
    serve(&config, use_case).await?;

    tracing::info!("Signal relay stopped");
    Ok(())
}

fn log_config(config: &Config) {
    tracing::info!(
        environment = %config.exchange.environment,
        category = %config.exchange.category,
        webhook_path = %config.server.webhook_path,
        quantity_source = ?config.execution.quantity_source,
        entry_price_source = ?config.execution.entry_price_source,
        allowlist_entries = config.security.allowed_ips.len(),
        "Configuration loaded"
    );
}

fn create_use_case(config: &Config) -> anyhow::Result<RelayUseCase> {
    let gateway = BybitGatewayAdapter::new(config.exchange.to_bybit_config())
        .context("creating Bybit gateway")?;

    if gateway.is_live() {
        tracing::warn!("MAINNET configured: orders will use real funds");
    } else {
        tracing::info!(environment = %gateway.environment(), "Using non-live venue");
    }

    let validator = SignalValidator::new(
        config.security.shared_secret.clone(),
        config.execution.normalizer(),
    );

    Ok(ExecuteSignalUseCase::new(
        Arc::new(gateway),
        validator,
        config.execution.to_profile(),
    ))
}

/// Run the HTTP server until a shutdown signal arrives.
async fn serve(config: &Config, use_case: RelayUseCase) -> anyhow::Result<()> {
    let state = AppState {
        execute_signal: Arc::new(use_case),
        request_timeout: config.server.request_timeout(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let options = RouterOptions {
        webhook_path: config.server.webhook_path.clone(),
        allowlist: config.allowlist()?,
    };
    let app = create_router(state, options);

    let http_addr = config.server.listen_addr();
    let listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("binding {http_addr}"))?;

    tracing::info!(%http_addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /");
    tracing::info!("  GET  /health");
    tracing::info!("  POST {}", config.server.webhook_path);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// If a handler cannot be installed, that branch never completes and the
/// other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    tracing::info!("Graceful shutdown started; waiting for in-flight executions");
}
