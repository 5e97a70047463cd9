//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless business logic (validation, pricing)
//! - **State Machines**: Per-signal execution lifecycle
//!
//! # Bounded Contexts
//!
//! - [`signal`]: Inbound signal authentication, parsing and normalization
//! - [`protection`]: Take-profit / stop-loss price derivation
//! - [`execution`]: Execution lifecycle of a single signal

pub mod execution;
pub mod protection;
pub mod shared;
pub mod signal;
