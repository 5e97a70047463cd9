//! Protection Calculator Domain Service
//!
//! Pure take-profit / stop-loss derivation. For a long position
//! `tp = entry * (1 + tp% / 100)` and `sl = entry * (1 - sl% / 100)`; a short
//! inverts the signs. In [`PercentMode::Margin`] the percentage is divided by
//! leverage first so it expresses a return on margin.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::protection::errors::ProtectionError;
use crate::domain::protection::value_objects::{
    PercentMode, PriceLeg, ProtectionOrder, StopPrices, TpSlMode, TriggerReference,
};
use crate::domain::shared::{Instrument, Side};

const HUNDRED: Decimal = dec!(100);

/// Derive take-profit and stop-loss trigger prices.
///
/// `leverage` only matters in [`PercentMode::Margin`].
///
/// # Errors
///
/// Returns [`ProtectionError::Overflow`] when a level does not fit in a
/// `Decimal`, or [`ProtectionError::InvalidLeverage`] for zero margin leverage.
pub fn derive_stops(
    entry_price: Decimal,
    side: Side,
    tp_percent: Decimal,
    sl_percent: Decimal,
    leverage: Decimal,
    mode: PercentMode,
) -> Result<StopPrices, ProtectionError> {
    Ok(StopPrices::new(
        take_profit_price(entry_price, side, tp_percent, leverage, mode)?,
        stop_loss_price(entry_price, side, sl_percent, leverage, mode)?,
    ))
}

/// Take-profit trigger price for one leg.
///
/// # Errors
///
/// See [`derive_stops`].
pub fn take_profit_price(
    entry_price: Decimal,
    side: Side,
    percent: Decimal,
    leverage: Decimal,
    mode: PercentMode,
) -> Result<Decimal, ProtectionError> {
    let fraction = effective_fraction(percent, leverage, mode)?;
    match side {
        Side::Buy => scale_up(entry_price, fraction, "take_profit"),
        Side::Sell => scale_down(entry_price, fraction, "take_profit"),
    }
}

/// Stop-loss trigger price for one leg.
///
/// # Errors
///
/// See [`derive_stops`].
pub fn stop_loss_price(
    entry_price: Decimal,
    side: Side,
    percent: Decimal,
    leverage: Decimal,
    mode: PercentMode,
) -> Result<Decimal, ProtectionError> {
    let fraction = effective_fraction(percent, leverage, mode)?;
    match side {
        Side::Buy => scale_down(entry_price, fraction, "stop_loss"),
        Side::Sell => scale_up(entry_price, fraction, "stop_loss"),
    }
}

/// Limit price for a protective leg, offset from the trigger so the closing
/// order crosses the book: below the trigger when the close sells (long
/// position), above it when the close buys (short position).
///
/// # Errors
///
/// Returns [`ProtectionError::Overflow`] when the offset price does not fit.
pub fn limit_price(
    trigger: Decimal,
    position_side: Side,
    slippage_percent: Decimal,
) -> Result<Decimal, ProtectionError> {
    let offset = slippage_percent
        .checked_div(HUNDRED)
        .ok_or(ProtectionError::Overflow { leg: "limit" })?;
    match position_side {
        Side::Buy => scale_down(trigger, offset, "limit"),
        Side::Sell => scale_up(trigger, offset, "limit"),
    }
}

fn scale_up(
    price: Decimal,
    fraction: Decimal,
    leg: &'static str,
) -> Result<Decimal, ProtectionError> {
    Decimal::ONE
        .checked_add(fraction)
        .and_then(|factor| price.checked_mul(factor))
        .ok_or(ProtectionError::Overflow { leg })
}

fn scale_down(
    price: Decimal,
    fraction: Decimal,
    leg: &'static str,
) -> Result<Decimal, ProtectionError> {
    Decimal::ONE
        .checked_sub(fraction)
        .and_then(|factor| price.checked_mul(factor))
        .ok_or(ProtectionError::Overflow { leg })
}

fn effective_fraction(
    percent: Decimal,
    leverage: Decimal,
    mode: PercentMode,
) -> Result<Decimal, ProtectionError> {
    let percent = match mode {
        PercentMode::Price => percent,
        PercentMode::Margin => {
            if leverage <= Decimal::ZERO {
                return Err(ProtectionError::InvalidLeverage { leverage });
            }
            percent
                .checked_div(leverage)
                .ok_or(ProtectionError::Overflow { leg: "percent" })?
        }
    };
    percent
        .checked_div(HUNDRED)
        .ok_or(ProtectionError::Overflow { leg: "percent" })
}

/// Deployment-wide protection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionSettings {
    /// How percentages are measured.
    pub percent_mode: PercentMode,
    /// Fallback take-profit percent when the signal carries none.
    pub tp_percent: Option<Decimal>,
    /// Fallback stop-loss percent when the signal carries none.
    pub sl_percent: Option<Decimal>,
    /// Trigger price series.
    pub trigger_by: TriggerReference,
    /// Full or partial coverage.
    pub tpsl_mode: TpSlMode,
    /// Execute legs as limit orders (partial mode only).
    pub limit_orders: bool,
    /// Limit offset from trigger, in percent.
    pub limit_slippage_percent: Decimal,
    /// Round derived prices to this many decimals.
    pub price_decimals: Option<u32>,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            percent_mode: PercentMode::default(),
            tp_percent: None,
            sl_percent: None,
            trigger_by: TriggerReference::default(),
            tpsl_mode: TpSlMode::default(),
            limit_orders: false,
            limit_slippage_percent: dec!(0.1),
            price_decimals: None,
        }
    }
}

/// Protection targets carried by a signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtectionTargets {
    /// Absolute take-profit price.
    pub take_profit_price: Option<Decimal>,
    /// Absolute stop-loss price.
    pub stop_loss_price: Option<Decimal>,
    /// Take-profit percent.
    pub tp_percent: Option<Decimal>,
    /// Stop-loss percent.
    pub sl_percent: Option<Decimal>,
}

/// Builds the [`ProtectionOrder`] for a freshly entered position.
///
/// Each leg takes the first available source: an absolute price from the
/// signal, a percentage from the signal, then the configured percentage.
/// A zero percentage disables its leg.
#[derive(Debug, Clone, Default)]
pub struct ProtectionCalculator {
    settings: ProtectionSettings,
}

impl ProtectionCalculator {
    /// Create a calculator with the given settings.
    #[must_use]
    pub const fn new(settings: ProtectionSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> &ProtectionSettings {
        &self.settings
    }

    /// Plan protection for a position.
    ///
    /// Returns `Ok(None)` when no source yields either leg.
    ///
    /// # Errors
    ///
    /// Returns error when the entry price or leverage cannot be used, or a
    /// derived level lands on the wrong side of the entry.
    pub fn plan(
        &self,
        instrument: &Instrument,
        side: Side,
        entry_price: Decimal,
        leverage: Decimal,
        size: Decimal,
        targets: &ProtectionTargets,
    ) -> Result<Option<ProtectionOrder>, ProtectionError> {
        if entry_price <= Decimal::ZERO {
            return Err(ProtectionError::InvalidEntryPrice { price: entry_price });
        }
        if self.settings.percent_mode == PercentMode::Margin && leverage <= Decimal::ZERO {
            return Err(ProtectionError::InvalidLeverage { leverage });
        }

        let mode = self.settings.percent_mode;
        let take_profit = self.resolve_leg(
            targets.take_profit_price,
            targets.tp_percent.or(self.settings.tp_percent),
            |pct| take_profit_price(entry_price, side, pct, leverage, mode),
        )?;
        let stop_loss = self.resolve_leg(
            targets.stop_loss_price,
            targets.sl_percent.or(self.settings.sl_percent),
            |pct| stop_loss_price(entry_price, side, pct, leverage, mode),
        )?;

        let invalid = |leg, price| ProtectionError::InvalidLevel {
            leg,
            price,
            entry_price,
            side,
        };
        if let Some(tp) = take_profit {
            let levels = StopPrices::new(tp, entry_price);
            if tp <= Decimal::ZERO || levels.reward(entry_price, side) <= Decimal::ZERO {
                return Err(invalid("take_profit", tp));
            }
        }
        if let Some(sl) = stop_loss {
            let levels = StopPrices::new(entry_price, sl);
            if sl <= Decimal::ZERO || levels.risk(entry_price, side) <= Decimal::ZERO {
                return Err(invalid("stop_loss", sl));
            }
        }

        if take_profit.is_none() && stop_loss.is_none() {
            return Ok(None);
        }

        let legs = |price: Option<Decimal>| price.map(|p| self.leg(p, side)).transpose();
        let partial = self.settings.tpsl_mode == TpSlMode::Partial;
        Ok(Some(ProtectionOrder {
            instrument: instrument.clone(),
            position_side: side,
            take_profit: legs(take_profit)?,
            stop_loss: legs(stop_loss)?,
            trigger_by: self.settings.trigger_by,
            mode: self.settings.tpsl_mode,
            size: partial.then_some(size),
        }))
    }

    fn resolve_leg(
        &self,
        absolute: Option<Decimal>,
        percent: Option<Decimal>,
        derive: impl Fn(Decimal) -> Result<Decimal, ProtectionError>,
    ) -> Result<Option<Decimal>, ProtectionError> {
        let price = match (absolute, percent.filter(|p| !p.is_zero())) {
            (Some(price), _) => Some(price),
            (None, Some(pct)) => Some(derive(pct)?),
            (None, None) => None,
        };
        Ok(price.map(|p| self.round(p)))
    }

    fn leg(&self, trigger: Decimal, side: Side) -> Result<PriceLeg, ProtectionError> {
        if self.settings.limit_orders && self.settings.tpsl_mode == TpSlMode::Partial {
            let limit = limit_price(trigger, side, self.settings.limit_slippage_percent)?;
            Ok(PriceLeg::limit(trigger, self.round(limit)))
        } else {
            Ok(PriceLeg::market(trigger))
        }
    }

    fn round(&self, price: Decimal) -> Decimal {
        match self.settings.price_decimals {
            Some(dp) => price.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
            None => price.normalize(),
        }
    }
}
