//! Execution profile.
//!
//! Deployment-time selection of how quantities, leverage, entry prices and
//! protection are sourced, so one orchestrator serves every payload variant.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::services::PollPolicy;
use crate::domain::protection::ProtectionSettings;

/// Where the order quantity comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantitySource {
    /// Opening signals must carry a quantity.
    Signal,
    /// Always the configured default quantity.
    #[default]
    Fixed,
}

/// Where the protection entry price comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPriceSource {
    /// Use the signal's entry price and skip polling when present.
    #[default]
    Signal,
    /// Always poll and use the venue's average entry price.
    Confirmed,
}

/// What to do when stops cannot be attached after a filled entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionFailurePolicy {
    /// Leave the position open and report it unprotected.
    #[default]
    LeaveOpen,
    /// Attempt one reduce-only close of the position.
    ClosePosition,
}

/// Unified execution settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionProfile {
    /// Quantity source.
    pub quantity_source: QuantitySource,
    /// Quantity used in fixed mode.
    pub default_quantity: Decimal,
    /// Leverage used when the signal carries none.
    pub default_leverage: Decimal,
    /// Entry price source.
    pub entry_price_source: EntryPriceSource,
    /// Pause after entry before confirming.
    pub settle_delay: Duration,
    /// Position confirmation polling.
    pub poll: PollPolicy,
    /// Stop derivation settings.
    pub protection: ProtectionSettings,
    /// Protection failure policy.
    pub on_protection_failure: ProtectionFailurePolicy,
    /// Serialize executions per instrument.
    pub serialize_per_instrument: bool,
}

impl Default for ExecutionProfile {
    fn default() -> Self {
        Self {
            quantity_source: QuantitySource::default(),
            default_quantity: Decimal::ONE,
            default_leverage: Decimal::ONE,
            entry_price_source: EntryPriceSource::default(),
            settle_delay: Duration::ZERO,
            poll: PollPolicy::default(),
            protection: ProtectionSettings::default(),
            on_protection_failure: ProtectionFailurePolicy::default(),
            serialize_per_instrument: true,
        }
    }
}

impl ExecutionProfile {
    /// Quantity for an opening order.
    #[must_use]
    pub fn entry_quantity(&self, signal_quantity: Option<Decimal>) -> Decimal {
        match self.quantity_source {
            QuantitySource::Signal => signal_quantity.unwrap_or(self.default_quantity),
            QuantitySource::Fixed => self.default_quantity,
        }
    }

    /// Leverage for an opening order.
    #[must_use]
    pub fn leverage(&self, signal_leverage: Option<Decimal>) -> Decimal {
        signal_leverage.unwrap_or(self.default_leverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fixed_quantity_ignores_signal() {
        let profile = ExecutionProfile {
            default_quantity: dec!(0.01),
            ..ExecutionProfile::default()
        };
        assert_eq!(profile.entry_quantity(Some(dec!(5))), dec!(0.01));
    }

    #[test]
    fn signal_quantity_preferred() {
        let profile = ExecutionProfile {
            quantity_source: QuantitySource::Signal,
            default_quantity: dec!(0.01),
            ..ExecutionProfile::default()
        };
        assert_eq!(profile.entry_quantity(Some(dec!(5))), dec!(5));
        assert_eq!(profile.entry_quantity(None), dec!(0.01));
    }

    #[test]
    fn leverage_falls_back_to_default() {
        let profile = ExecutionProfile {
            default_leverage: dec!(10),
            ..ExecutionProfile::default()
        };
        assert_eq!(profile.leverage(None), dec!(10));
        assert_eq!(profile.leverage(Some(dec!(20))), dec!(20));
    }
}
