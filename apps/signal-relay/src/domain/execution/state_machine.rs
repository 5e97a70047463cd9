//! Execution State Machine
//!
//! `Validated → LeverageSet → Entered → PositionConfirmed → ProtectionAttached → Done`,
//! with `Aborted` reachable from every non-terminal stage. Close signals skip
//! leverage and protection (`Validated → Entered → Done`), and an entry with
//! nothing to protect finishes from `PositionConfirmed`.

use super::stage::{AbortReason, ExecutionStage};
use crate::domain::shared::DomainError;

/// Transition rules for [`ExecutionStage`].
pub struct ExecutionStateMachine;

impl ExecutionStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: ExecutionStage, to: ExecutionStage) -> bool {
        if to == ExecutionStage::Aborted {
            return !from.is_terminal();
        }

        matches!(
            (from, to),
            (ExecutionStage::Validated, ExecutionStage::LeverageSet)
                | (ExecutionStage::Validated, ExecutionStage::Entered)
                | (ExecutionStage::LeverageSet, ExecutionStage::Entered)
                | (ExecutionStage::Entered, ExecutionStage::PositionConfirmed)
                | (ExecutionStage::Entered, ExecutionStage::Done)
                | (ExecutionStage::PositionConfirmed, ExecutionStage::ProtectionAttached)
                | (ExecutionStage::PositionConfirmed, ExecutionStage::Done)
                | (ExecutionStage::ProtectionAttached, ExecutionStage::Done)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(
        from: ExecutionStage,
        to: ExecutionStage,
    ) -> Result<(), DomainError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition {
                entity: "Execution".to_string(),
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

/// Tracks one signal's progress through the stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTracker {
    stage: ExecutionStage,
    abort_reason: Option<AbortReason>,
    aborted_from: Option<ExecutionStage>,
}

impl Default for ExecutionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionTracker {
    /// Start tracking a freshly validated signal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: ExecutionStage::Validated,
            abort_reason: None,
            aborted_from: None,
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> ExecutionStage {
        self.stage
    }

    /// Abort reason, once aborted.
    #[must_use]
    pub const fn abort_reason(&self) -> Option<AbortReason> {
        self.abort_reason
    }

    /// Stage the execution was in when it aborted.
    #[must_use]
    pub const fn aborted_from(&self) -> Option<ExecutionStage> {
        self.aborted_from
    }

    /// Move to the next stage.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn advance(&mut self, to: ExecutionStage) -> Result<(), DomainError> {
        if to == ExecutionStage::Aborted {
            return Err(DomainError::invalid_value(
                "stage",
                "use abort() to record an abort reason",
            ));
        }
        ExecutionStateMachine::validate_transition(self.stage, to)?;
        self.stage = to;
        Ok(())
    }

    /// Abort from the current stage.
    ///
    /// # Errors
    ///
    /// Returns error if the execution already finished.
    pub fn abort(&mut self, reason: AbortReason) -> Result<(), DomainError> {
        ExecutionStateMachine::validate_transition(self.stage, ExecutionStage::Aborted)?;
        self.aborted_from = Some(self.stage);
        self.abort_reason = Some(reason);
        self.stage = ExecutionStage::Aborted;
        Ok(())
    }

    /// Whether an order may be live on the venue without the execution
    /// having completed.
    #[must_use]
    pub fn left_exposure(&self) -> bool {
        self.aborted_from.is_some_and(|s| s.has_exposure())
    }
}
