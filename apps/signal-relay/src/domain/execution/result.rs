//! Execution result returned to the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::stage::{AbortReason, ExecutionStage};
use crate::domain::shared::{Instrument, Side};
use crate::domain::signal::SignalAction;

/// Terminal status of one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Every step completed.
    Success,
    /// Nothing to do (unsupported action, nothing to close).
    Ignored,
    /// A step failed.
    Failed,
}

impl ExecutionStatus {
    /// Stable label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Ignored => "ignored",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the relay did on the venue for one signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDetails {
    /// Correlation id of the execution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_id: Option<String>,
    /// Normalized instrument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<Instrument>,
    /// Recognized action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<SignalAction>,
    /// Order side sent to the venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Order quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// Leverage applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<Decimal>,
    /// Venue order id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Entry price used for protection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<Decimal>,
    /// Take-profit trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    /// Stop-loss trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    /// Last stage reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<ExecutionStage>,
    /// Abort reason, when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<AbortReason>,
    /// An open position was left without stops.
    pub position_unprotected: bool,
    /// Outcome of the compensating close, when one was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensating_close: Option<String>,
}

/// Terminal value of one signal's execution. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Outcome.
    pub status: ExecutionStatus,
    /// Human-readable summary.
    pub message: String,
    /// Error detail for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Venue-side details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ExecutionDetails>,
}

impl ExecutionResult {
    /// Successful execution.
    #[must_use]
    pub fn success(message: impl Into<String>, details: ExecutionDetails) -> Self {
        Self {
            status: ExecutionStatus::Success,
            message: message.into(),
            error: None,
            details: Some(details),
        }
    }

    /// Signal accepted but nothing to do.
    #[must_use]
    pub fn ignored(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Ignored,
            message: message.into(),
            error: None,
            details: None,
        }
    }

    /// Failed execution.
    #[must_use]
    pub fn failed(
        message: impl Into<String>,
        error: impl Into<String>,
        details: ExecutionDetails,
    ) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            message: message.into(),
            error: Some(error.into()),
            details: Some(details),
        }
    }

    /// Whether the execution left an open position without stops.
    #[must_use]
    pub fn position_unprotected(&self) -> bool {
        self.details.as_ref().is_some_and(|d| d.position_unprotected)
    }
}
