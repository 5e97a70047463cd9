//! Application errors.
//!
//! One error type per pipeline step, folded into [`ExecutionFailure`] by the
//! orchestrator.

use thiserror::Error;

use crate::application::ports::GatewayError;
use crate::domain::execution::AbortReason;
use crate::domain::protection::ProtectionError;

/// Leverage could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("leverage not applied: {0}")]
pub struct LeverageError(pub GatewayError);

/// Order was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("order not placed: {0}")]
pub struct OrderError(pub GatewayError);

/// Protective stops were not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("protective stop not attached: {0}")]
pub struct StopError(pub GatewayError);

/// Position confirmation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmationError {
    /// No qualifying snapshot within the attempt budget.
    #[error("position not confirmed open after {attempts} attempts")]
    Timeout {
        /// Attempts made.
        attempts: u32,
    },

    /// Snapshot could not be understood.
    #[error("invalid position response: {0}")]
    InvalidResponse(GatewayError),

    /// Non-transient venue failure while polling.
    #[error("position lookup failed: {0}")]
    Gateway(GatewayError),
}

/// Why an accepted signal's execution failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFailure {
    /// Leverage step failed.
    #[error(transparent)]
    Leverage(#[from] LeverageError),

    /// Entry or close order failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Position confirmation failed.
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    /// Position read for a close signal failed.
    #[error("position lookup failed: {0}")]
    PositionLookup(GatewayError),

    /// No usable entry price to derive stops from.
    #[error("entry price unavailable for protection")]
    MissingEntryPrice,

    /// Stop derivation failed.
    #[error("protection could not be derived: {0}")]
    ProtectionPlan(#[from] ProtectionError),

    /// Stop attachment failed.
    #[error(transparent)]
    Stop(#[from] StopError),
}

impl ExecutionFailure {
    /// Abort reason recorded on the execution.
    #[must_use]
    pub const fn abort_reason(&self) -> AbortReason {
        match self {
            Self::Leverage(_) => AbortReason::Leverage,
            Self::Order(_) => AbortReason::Order,
            Self::Confirmation(ConfirmationError::Timeout { .. }) => AbortReason::PositionTimeout,
            Self::Confirmation(ConfirmationError::InvalidResponse(_)) => {
                AbortReason::InvalidResponse
            }
            Self::Confirmation(ConfirmationError::Gateway(_)) | Self::PositionLookup(_) => {
                AbortReason::PositionLookup
            }
            Self::MissingEntryPrice | Self::ProtectionPlan(_) | Self::Stop(_) => {
                AbortReason::Protection
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GatewayErrorKind;

    fn gateway_error() -> GatewayError {
        GatewayError::new(GatewayErrorKind::Rejected, "nope").with_code(10001)
    }

    #[test]
    fn abort_reasons() {
        assert_eq!(
            ExecutionFailure::from(LeverageError(gateway_error())).abort_reason(),
            AbortReason::Leverage
        );
        assert_eq!(
            ExecutionFailure::from(ConfirmationError::Timeout { attempts: 3 }).abort_reason(),
            AbortReason::PositionTimeout
        );
        assert_eq!(
            ExecutionFailure::from(ConfirmationError::InvalidResponse(gateway_error()))
                .abort_reason(),
            AbortReason::InvalidResponse
        );
        assert_eq!(
            ExecutionFailure::from(StopError(gateway_error())).abort_reason(),
            AbortReason::Protection
        );
    }

    #[test]
    fn transparent_display() {
        let failure = ExecutionFailure::from(OrderError(gateway_error()));
        assert_eq!(failure.to_string(), "order not placed: rejected: nope");
    }
}
