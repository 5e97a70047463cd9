//! HTTP/REST API adapter.
//!
//! Inbound adapter serving the signal webhook, root and health endpoints.

mod controller;
mod ip_allowlist;
mod request;
mod response;

pub use controller::{AppState, RouterOptions, create_router};
pub use ip_allowlist::{IpAllowlist, enforce_allowlist};
pub use request::*;
pub use response::*;
