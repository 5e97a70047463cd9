//! Protection order submitted to the venue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::modes::{TpSlMode, TriggerReference};
use crate::domain::shared::{Instrument, Side};

/// One protective leg: the trigger and, for limit execution, the limit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLeg {
    /// Trigger price.
    pub trigger: Decimal,
    /// Limit price, when the leg executes as a limit order.
    pub limit: Option<Decimal>,
}

impl PriceLeg {
    /// Market-executed leg.
    #[must_use]
    pub const fn market(trigger: Decimal) -> Self {
        Self {
            trigger,
            limit: None,
        }
    }

    /// Limit-executed leg.
    #[must_use]
    pub const fn limit(trigger: Decimal, limit: Decimal) -> Self {
        Self {
            trigger,
            limit: Some(limit),
        }
    }
}

/// Take-profit / stop-loss configuration for one open position.
///
/// Derived once per signal and submitted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionOrder {
    /// Protected instrument.
    pub instrument: Instrument,
    /// Direction of the protected position.
    pub position_side: Side,
    /// Take-profit leg.
    pub take_profit: Option<PriceLeg>,
    /// Stop-loss leg.
    pub stop_loss: Option<PriceLeg>,
    /// Price series that fires the legs.
    pub trigger_by: TriggerReference,
    /// Full or partial coverage.
    pub mode: TpSlMode,
    /// Covered size (partial mode only).
    pub size: Option<Decimal>,
}

impl ProtectionOrder {
    /// Whether neither leg is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.take_profit.is_none() && self.stop_loss.is_none()
    }

    /// Whether any leg executes as a limit order.
    #[must_use]
    pub fn uses_limit_orders(&self) -> bool {
        [self.take_profit, self.stop_loss]
            .iter()
            .flatten()
            .any(|leg| leg.limit.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(take_profit: Option<PriceLeg>, stop_loss: Option<PriceLeg>) -> ProtectionOrder {
        ProtectionOrder {
            instrument: Instrument::new("BTCUSDT"),
            position_side: Side::Buy,
            take_profit,
            stop_loss,
            trigger_by: TriggerReference::LastPrice,
            mode: TpSlMode::Full,
            size: None,
        }
    }

    #[test]
    fn empty_order() {
        assert!(order(None, None).is_empty());
        assert!(!order(Some(PriceLeg::market(dec!(110))), None).is_empty());
    }

    #[test]
    fn limit_detection() {
        assert!(!order(Some(PriceLeg::market(dec!(110))), None).uses_limit_orders());
        assert!(order(None, Some(PriceLeg::limit(dec!(95), dec!(94.9)))).uses_limit_orders());
    }
}
