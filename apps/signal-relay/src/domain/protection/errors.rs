//! Protection errors.

use rust_decimal::Decimal;
use std::fmt;

use crate::domain::shared::Side;

/// Errors raised while deriving protective stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectionError {
    /// A leg is not positive or sits on the wrong side of the entry price.
    InvalidLevel {
        /// "take_profit" or "stop_loss".
        leg: &'static str,
        /// Trigger price.
        price: Decimal,
        /// Entry price.
        entry_price: Decimal,
        /// Position direction.
        side: Side,
    },

    /// Entry price is not usable for derivation.
    InvalidEntryPrice {
        /// Offending price.
        price: Decimal,
    },

    /// Leverage is not usable for margin-based targets.
    InvalidLeverage {
        /// Offending leverage.
        leverage: Decimal,
    },

    /// A derived price does not fit in a `Decimal`.
    Overflow {
        /// Leg or intermediate being computed.
        leg: &'static str,
    },
}

impl fmt::Display for ProtectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLevel {
                leg,
                price,
                entry_price,
                side,
            } => write!(
                f,
                "Invalid {leg} {price} for {} position entered at {entry_price}",
                side.direction()
            ),
            Self::InvalidEntryPrice { price } => write!(f, "Invalid entry price {price}"),
            Self::InvalidLeverage { leverage } => write!(f, "Invalid leverage {leverage}"),
            Self::Overflow { leg } => write!(f, "Arithmetic overflow deriving {leg} price"),
        }
    }
}

impl std::error::Error for ProtectionError {}
