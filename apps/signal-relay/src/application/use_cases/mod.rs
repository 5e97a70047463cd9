//! Use Cases
//!
//! Application-specific business rules that orchestrate domain services
//! and ports.

mod execute_signal;

pub use execute_signal::ExecuteSignalUseCase;
