//! Execution stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of one signal's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStage {
    /// Signal authenticated and parsed.
    Validated,
    /// Leverage applied or already in place.
    LeverageSet,
    /// Market order acknowledged.
    Entered,
    /// Position observed open (or entry price supplied).
    PositionConfirmed,
    /// Protective stops accepted by the venue.
    ProtectionAttached,
    /// Execution complete.
    Done,
    /// Execution stopped on a hard failure.
    Aborted,
}

impl ExecutionStage {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true once an order may have reached the venue.
    #[must_use]
    pub const fn has_exposure(&self) -> bool {
        matches!(
            self,
            Self::Entered | Self::PositionConfirmed | Self::ProtectionAttached
        )
    }

    /// Stable label used in logs and responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validated => "validated",
            Self::LeverageSet => "leverage_set",
            Self::Entered => "entered",
            Self::PositionConfirmed => "position_confirmed",
            Self::ProtectionAttached => "protection_attached",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an execution was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// Leverage could not be applied.
    Leverage,
    /// Entry (or close) order was refused.
    Order,
    /// Position never showed as open.
    PositionTimeout,
    /// Venue answered with an unusable payload.
    InvalidResponse,
    /// Position could not be read.
    PositionLookup,
    /// Protective stops could not be derived or attached.
    Protection,
}

impl AbortReason {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Leverage => "leverage",
            Self::Order => "order",
            Self::PositionTimeout => "position_timeout",
            Self::InvalidResponse => "invalid_response",
            Self::PositionLookup => "position_lookup",
            Self::Protection => "protection",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_stages() {
        assert!(ExecutionStage::Done.is_terminal());
        assert!(ExecutionStage::Aborted.is_terminal());
        assert!(!ExecutionStage::Entered.is_terminal());
    }

    #[test]
    fn exposure_stages() {
        assert!(!ExecutionStage::LeverageSet.has_exposure());
        assert!(ExecutionStage::Entered.has_exposure());
        assert!(ExecutionStage::PositionConfirmed.has_exposure());
    }

    #[test]
    fn labels() {
        assert_eq!(ExecutionStage::PositionConfirmed.to_string(), "position_confirmed");
        assert_eq!(AbortReason::PositionTimeout.to_string(), "position_timeout");
    }
}
