//! Stop Price Value Objects

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Side;

/// Take-profit and stop-loss trigger prices for one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPrices {
    /// Take-profit trigger price.
    pub take_profit: Decimal,
    /// Stop-loss trigger price.
    pub stop_loss: Decimal,
}

impl StopPrices {
    /// Create new stop prices.
    #[must_use]
    pub const fn new(take_profit: Decimal, stop_loss: Decimal) -> Self {
        Self {
            take_profit,
            stop_loss,
        }
    }

    /// Distance from entry to the stop (positive when sensible).
    #[must_use]
    pub fn risk(&self, entry_price: Decimal, side: Side) -> Decimal {
        match side {
            Side::Buy => entry_price - self.stop_loss,
            Side::Sell => self.stop_loss - entry_price,
        }
    }

    /// Distance from entry to the target (positive when sensible).
    #[must_use]
    pub fn reward(&self, entry_price: Decimal, side: Side) -> Decimal {
        match side {
            Side::Buy => self.take_profit - entry_price,
            Side::Sell => entry_price - self.take_profit,
        }
    }

    /// Whether the levels bracket the entry on the correct sides.
    #[must_use]
    pub fn is_valid_for(&self, entry_price: Decimal, side: Side) -> bool {
        self.risk(entry_price, side) > Decimal::ZERO
            && self.reward(entry_price, side) > Decimal::ZERO
    }
}
