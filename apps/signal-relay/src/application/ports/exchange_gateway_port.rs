//! Exchange Gateway Port (Driven Port)
//!
//! Contract the execution pipeline depends on. Adapters map raw venue
//! failures into the closed [`GatewayErrorKind`] set before they reach
//! application code.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::protection::ProtectionOrder;
use crate::domain::shared::{Instrument, Side};

/// Request to change an instrument's leverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageRequest {
    /// Instrument to configure.
    pub instrument: Instrument,
    /// Leverage for the buy side.
    pub buy_leverage: Decimal,
    /// Leverage for the sell side.
    pub sell_leverage: Decimal,
}

impl LeverageRequest {
    /// Same leverage on both sides.
    #[must_use]
    pub fn symmetric(instrument: Instrument, leverage: Decimal) -> Self {
        Self {
            instrument,
            buy_leverage: leverage,
            sell_leverage: leverage,
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Market order.
    #[default]
    Market,
}

impl OrderType {
    /// Venue wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "Market",
        }
    }
}

/// Request to place an order. Built fresh for every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Client order ID, unique per request.
    pub client_order_id: String,
    /// Instrument to trade.
    pub instrument: Instrument,
    /// Order side.
    pub side: Side,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Only reduce an existing position.
    pub reduce_only: bool,
}

impl OrderRequest {
    /// Create a market order with a fresh client order ID.
    #[must_use]
    pub fn market(instrument: Instrument, side: Side, quantity: Decimal) -> Self {
        Self {
            client_order_id: Uuid::new_v4().to_string(),
            instrument,
            side,
            order_type: OrderType::Market,
            quantity,
            reduce_only: false,
        }
    }

    /// Mark the order reduce-only.
    #[must_use]
    pub const fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }
}

/// Acknowledgment after order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Venue-assigned order ID.
    pub order_id: String,
    /// Client order ID echoed back.
    pub client_order_id: String,
}

/// Point-in-time position state as reported by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Instrument.
    pub instrument: Instrument,
    /// Direction, `None` when flat.
    pub side: Option<Side>,
    /// Absolute size.
    pub size: Decimal,
    /// Average entry price, when open.
    pub average_entry_price: Option<Decimal>,
}

impl PositionSnapshot {
    /// Whether the snapshot shows an open position on `side`.
    #[must_use]
    pub fn is_open_for(&self, side: Side) -> bool {
        self.side == Some(side) && self.size > Decimal::ZERO
    }

    /// Whether no position is open.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.side.is_none() || self.size <= Decimal::ZERO
    }
}

/// Closed set of gateway failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// Requested leverage equals the current leverage.
    LeverageNotModified,
    /// Not enough margin.
    InsufficientBalance,
    /// Venue refused the request.
    Rejected,
    /// Too many requests.
    RateLimited,
    /// Credentials or signature refused.
    Authentication,
    /// Network failure or timeout.
    Transport,
    /// Response could not be understood.
    InvalidResponse,
    /// Anything else.
    Unknown,
}

impl GatewayErrorKind {
    /// Whether retrying the same read may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport | Self::RateLimited)
    }

    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LeverageNotModified => "leverage_not_modified",
            Self::InsufficientBalance => "insufficient_balance",
            Self::Rejected => "rejected",
            Self::RateLimited => "rate_limited",
            Self::Authentication => "authentication",
            Self::Transport => "transport",
            Self::InvalidResponse => "invalid_response",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    /// Classified kind.
    pub kind: GatewayErrorKind,
    /// Venue error code, when the venue supplied one.
    pub code: Option<i64>,
    /// Venue message.
    pub message: String,
}

impl GatewayError {
    /// Create an error.
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    /// Attach the venue error code.
    #[must_use]
    pub const fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Shorthand for an [`GatewayErrorKind::InvalidResponse`] error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidResponse, message)
    }
}

/// Port for venue interactions.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Set leverage for an instrument.
    async fn set_leverage(&self, request: &LeverageRequest) -> Result<(), GatewayError>;

    /// Place an order.
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, GatewayError>;

    /// Read the current position. `None` when the venue reports no entry.
    async fn get_position(
        &self,
        instrument: &Instrument,
    ) -> Result<Option<PositionSnapshot>, GatewayError>;

    /// Attach take-profit / stop-loss to an open position.
    async fn set_protective_stop(&self, order: &ProtectionOrder) -> Result<(), GatewayError>;
}
