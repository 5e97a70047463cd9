//! Signal Bounded Context
//!
//! Inbound trade signals: authentication, action parsing, instrument
//! normalization and numeric field validation.

pub mod action;
pub mod errors;
pub mod raw;
pub mod validator;

pub use action::SignalAction;
pub use errors::SignalRejection;
pub use raw::RawSignal;
pub use validator::{Signal, SignalValidator, Validation};
