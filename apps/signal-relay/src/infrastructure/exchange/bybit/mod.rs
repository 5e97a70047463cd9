//! Bybit V5 Gateway Adapter
//!
//! Implementation of `ExchangeGateway` for the Bybit V5 REST API with:
//! - HMAC-SHA256 request signing
//! - `retCode` classification into the port's error kinds
//! - Retry with exponential backoff for reads only
//! - Environment-aware logging (TESTNET vs MAINNET)

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod signer;

pub use adapter::BybitGatewayAdapter;
pub use config::{BybitConfig, BybitEnvironment, RetryConfig};
pub use error::{BybitError, LEVERAGE_NOT_MODIFIED, classify_ret_code};
