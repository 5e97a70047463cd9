//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driven Ports** (Secondary/Outbound): How our application uses external systems

mod exchange_gateway_port;

pub use exchange_gateway_port::{
    ExchangeGateway, GatewayError, GatewayErrorKind, LeverageRequest, OrderAck, OrderRequest,
    OrderType, PositionSnapshot,
};
