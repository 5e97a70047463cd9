//! HTTP Controller (Driver Adapter)
//!
//! Axum-based webhook endpoint that delegates to the execute-signal use case.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::application::ports::ExchangeGateway;
use crate::application::use_cases::ExecuteSignalUseCase;
use crate::domain::execution::ExecutionStatus;
use crate::domain::signal::{RawSignal, SignalRejection};
use crate::observability::record_signal_outcome;

use super::ip_allowlist::{IpAllowlist, enforce_allowlist};
use super::request::WebhookRequest;
use super::response::{ErrorResponse, HealthResponse, RootResponse, SignalResponse};

/// Application state shared across handlers.
pub struct AppState<G: ExchangeGateway> {
    /// Use case for executing signals.
    pub execute_signal: Arc<ExecuteSignalUseCase<G>>,
    /// Upper bound on how long a caller waits for an execution.
    pub request_timeout: Duration,
    /// Application version.
    pub version: String,
}

impl<G: ExchangeGateway> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            execute_signal: Arc::clone(&self.execute_signal),
            request_timeout: self.request_timeout,
            version: self.version.clone(),
        }
    }
}

/// Routing options.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Path the webhook is served on.
    pub webhook_path: String,
    /// Source-IP allowlist for the webhook.
    pub allowlist: IpAllowlist,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            webhook_path: "/tradingview-webhook".to_string(),
            allowlist: IpAllowlist::disabled(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<G>(state: AppState<G>, options: RouterOptions) -> Router
where
    G: ExchangeGateway + 'static,
{
    let allowlist = Arc::new(options.allowlist);

    let webhook = Router::new()
        .route(&options.webhook_path, post(receive_signal::<G>))
        .route_layer(middleware::from_fn_with_state(allowlist, enforce_allowlist));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check::<G>))
        .merge(webhook)
        .with_state(state)
}

/// Root endpoint.
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Signal relay is running.".to_string(),
    })
}

/// Health check endpoint.
async fn health_check<G: ExchangeGateway>(State(state): State<AppState<G>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Webhook endpoint.
///
/// The body is parsed regardless of content type; alert senders often use
/// `text/plain`. The execution runs on its own task, so a caller that
/// times out or disconnects never cancels venue operations mid-sequence.
async fn receive_signal<G>(State(state): State<AppState<G>>, body: Bytes) -> Response
where
    G: ExchangeGateway + 'static,
{
    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            record_signal_outcome("rejected", "invalid_json");
            tracing::warn!(error = %e, "Webhook body is not valid JSON");
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(format!("Invalid JSON payload: {e}")),
            );
        }
    };

    let raw = RawSignal::from(request);
    let use_case = Arc::clone(&state.execute_signal);
    let task = tokio::spawn(async move { use_case.handle(raw).await });

    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(Ok(result))) => match result.status {
            ExecutionStatus::Failed => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::from(result),
            ),
            ExecutionStatus::Success | ExecutionStatus::Ignored => {
                (StatusCode::OK, Json(SignalResponse::from(result))).into_response()
            }
        },
        Ok(Ok(Err(rejection))) => {
            let status = match rejection {
                SignalRejection::Unauthorized => StatusCode::UNAUTHORIZED,
                SignalRejection::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            };
            error_response(status, ErrorResponse::new(rejection.to_string()))
        }
        Ok(Err(join_error)) => {
            tracing::error!(error = %join_error, "Execution task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Execution task failed"),
            )
        }
        Err(_) => {
            tracing::error!(
                timeout_ms = state.request_timeout.as_millis(),
                "Execution still running at request timeout; it continues in the background"
            );
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(format!(
                    "Execution did not finish within {} ms and continues in the background; check the venue",
                    state.request_timeout.as_millis()
                )),
            )
        }
    }
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::profile::ExecutionProfile;
    use crate::application::testing::FakeGateway;
    use crate::domain::shared::InstrumentNormalizer;
    use crate::domain::signal::SignalValidator;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state(gateway: &Arc<FakeGateway>) -> AppState<FakeGateway> {
        let use_case = ExecuteSignalUseCase::new(
            Arc::clone(gateway),
            SignalValidator::new("ok", InstrumentNormalizer::default()),
            ExecutionProfile::default(),
        );
        AppState {
            execute_signal: Arc::new(use_case),
            request_timeout: Duration::from_secs(5),
            version: "1.0.0-test".to_string(),
        }
    }

    fn post_hook(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/tradingview-webhook")
            .header("content-type", "text/plain")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let gateway = Arc::new(FakeGateway::new());
        let app = create_router(create_test_state(&gateway), RouterOptions::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["version"], "1.0.0-test");
    }

    #[tokio::test]
    async fn root_reports_running() {
        let gateway = Arc::new(FakeGateway::new());
        let app = create_router(create_test_state(&gateway), RouterOptions::default());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["message"],
            "Signal relay is running."
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let gateway = Arc::new(FakeGateway::new());
        let app = create_router(create_test_state(&gateway), RouterOptions::default());

        let response = app.oneshot(post_hook("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["detail"].is_string());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn plain_text_content_type_accepted() {
        let gateway = Arc::new(FakeGateway::new());
        let app = create_router(create_test_state(&gateway), RouterOptions::default());

        let response = app
            .oneshot(post_hook(
                r#"{"secret":"ok","symbol":"BTCUSDT","action":"hold"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ignored");
    }

    #[tokio::test]
    async fn allowlist_blocks_unknown_peer() {
        let gateway = Arc::new(FakeGateway::new());
        let options = RouterOptions {
            allowlist: IpAllowlist::new(["52.89.214.238"], false).unwrap(),
            ..RouterOptions::default()
        };
        let app = create_router(create_test_state(&gateway), options);

        let mut request = post_hook(r#"{"secret":"ok","symbol":"BTCUSDT","action":"buy"}"#);
        request
            .extensions_mut()
            .insert(axum::extract::ConnectInfo(std::net::SocketAddr::from((
                [203, 0, 113, 9],
                443,
            ))));

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["detail"], "Access denied");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn allowlist_does_not_guard_health() {
        let gateway = Arc::new(FakeGateway::new());
        let options = RouterOptions {
            allowlist: IpAllowlist::new(["52.89.214.238"], false).unwrap(),
            ..RouterOptions::default()
        };
        let app = create_router(create_test_state(&gateway), options);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
