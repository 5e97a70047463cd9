//! HTTP client wrapper with signing and retry logic.
//!
//! GET requests are retried with exponential backoff. POST requests are
//! sent exactly once: a lost response to an order placement must never
//! turn into a second order.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::Envelope;
use super::config::{BybitConfig, RetryConfig};
use super::error::BybitError;
use super::signer::{
    HEADER_API_KEY, HEADER_RECV_WINDOW, HEADER_SIGN, HEADER_TIMESTAMP, RequestSigner,
};

/// HTTP client for the Bybit V5 API.
#[derive(Debug, Clone)]
pub struct BybitHttpClient {
    client: Client,
    signer: RequestSigner,
    base_url: String,
    recv_window_ms: u64,
    retry_config: RetryConfig,
}

impl BybitHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &BybitConfig) -> Result<Self, BybitError> {
        let signer = RequestSigner::new(&config.api_key, &config.api_secret)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BybitError::Network(e.to_string()))?;

        Ok(Self {
            client,
            signer,
            base_url: config.base_url().to_string(),
            recv_window_ms: u64::try_from(config.recv_window.as_millis()).unwrap_or(5000),
            retry_config: config.retry.clone(),
        })
    }

    /// Signed GET. `query` is sent and signed in the given order.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BybitError> {
        let query_string = query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let url = if query_string.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query_string}", self.base_url)
        };

        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let request = self.signed(self.client.get(&url), &query_string)?;

            let error = match self.send(request).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let retry_after = match &error {
                BybitError::RateLimited { retry_after_secs } => {
                    Some(Duration::from_secs(*retry_after_secs))
                }
                _ => None,
            };

            if !is_retryable(&error) {
                return Err(error);
            }

            let Some(delay) = backoff.next_backoff() else {
                return Err(BybitError::MaxRetriesExceeded {
                    attempts: backoff.attempt,
                    last_error: error.to_string(),
                });
            };
            let delay =
                retry_after.map_or(delay, |after| after.min(self.retry_config.max_backoff));

            tracing::warn!(
                path,
                error = %error,
                delay_ms = delay.as_millis(),
                attempt = backoff.attempt,
                "Read failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Signed POST with a JSON body. Never retried.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BybitError> {
        let payload =
            serde_json::to_string(body).map_err(|e| BybitError::JsonParse(e.to_string()))?;
        let url = format!("{}{path}", self.base_url);

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json");
        let request = self.signed(request, &payload)?.body(payload);

        self.send(request).await
    }

    fn signed(
        &self,
        request: RequestBuilder,
        payload: &str,
    ) -> Result<RequestBuilder, BybitError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let signature = self.signer.sign(timestamp, self.recv_window_ms, payload)?;

        Ok(request
            .header(HEADER_API_KEY, self.signer.api_key())
            .header(HEADER_TIMESTAMP, timestamp.to_string())
            .header(HEADER_RECV_WINDOW, self.recv_window_ms.to_string())
            .header(HEADER_SIGN, signature))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BybitError> {
        let response = request
            .send()
            .await
            .map_err(|e| BybitError::Network(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BybitError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(BybitError::RateLimited { retry_after_secs });
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(BybitError::AuthenticationFailed {
            status: status.as_u16(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| BybitError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(BybitError::Http {
            status: status.as_u16(),
            body: text,
        });
    }

    let envelope: Envelope =
        serde_json::from_str(&text).map_err(|e| BybitError::JsonParse(e.to_string()))?;
    envelope.into_result()
}

/// Whether a failed read is worth repeating.
fn is_retryable(error: &BybitError) -> bool {
    match error {
        BybitError::Network(_) | BybitError::RateLimited { .. } => true,
        BybitError::Http { status, .. } => matches!(*status, 408 | 500 | 502 | 503 | 504),
        BybitError::Api { code, .. } => matches!(*code, 10_006 | 10_016 | 10_018),
        _ => false,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}
