//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::execution::{ExecutionDetails, ExecutionResult, ExecutionStatus};

/// Body for 200 responses (success or ignored).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponse {
    /// `success` or `ignored`.
    pub status: ExecutionStatus,
    /// Human-readable outcome.
    pub message: String,
    /// What was done on the venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ExecutionDetails>,
}

impl From<ExecutionResult> for SignalResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            status: result.status,
            message: result.message,
            details: result.details,
        }
    }
}

/// Body for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub detail: String,
    /// Underlying error, for failed executions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Partial execution record, for failed executions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ExecutionDetails>,
}

impl ErrorResponse {
    /// Error with only a reason.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            error: None,
            details: None,
        }
    }
}

impl From<ExecutionResult> for ErrorResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            detail: result.message,
            error: result.error,
            details: result.details,
        }
    }
}

/// Root endpoint body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    /// Liveness message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}
