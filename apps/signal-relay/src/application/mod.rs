//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for interacting with the venue
//! - **Services**: One wrapper per pipeline step
//! - **Use Cases**: Sequencing and failure policy for a signal

pub mod errors;
pub mod ports;
pub mod profile;
pub mod services;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{ConfirmationError, ExecutionFailure, LeverageError, OrderError, StopError};
pub use ports::*;
pub use profile::{EntryPriceSource, ExecutionProfile, ProtectionFailurePolicy, QuantitySource};
pub use use_cases::*;
