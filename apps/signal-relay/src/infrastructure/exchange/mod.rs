//! Exchange Adapters
//!
//! Implementations of `ExchangeGateway` for derivatives venues.

pub mod bybit;

pub use bybit::{BybitConfig, BybitEnvironment, BybitError, BybitGatewayAdapter};
