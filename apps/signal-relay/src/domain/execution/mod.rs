//! Execution Bounded Context
//!
//! Lifecycle of a single signal's execution and the terminal result handed
//! back to the caller.

pub mod result;
pub mod stage;
pub mod state_machine;

pub use result::{ExecutionDetails, ExecutionResult, ExecutionStatus};
pub use stage::{AbortReason, ExecutionStage};
pub use state_machine::{ExecutionStateMachine, ExecutionTracker};
