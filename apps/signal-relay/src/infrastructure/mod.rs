//! Infrastructure Layer
//!
//! This module contains all adapters (implementations) for the ports defined
//! in the application layer. Following hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**: Implement ports for external systems
//!   - `exchange/`: Venue API adapters (Bybit V5)
//!
//! - **Driver Adapters (Inbound)**: Expose application to external world
//!   - `http/`: Webhook and health endpoints

pub mod exchange;
pub mod http;
