//! Execution profile configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::profile::{
    EntryPriceSource, ExecutionProfile, ProtectionFailurePolicy, QuantitySource,
};
use crate::application::services::{Backoff, PollPolicy};
use crate::domain::protection::{PercentMode, ProtectionSettings, TpSlMode, TriggerReference};
use crate::domain::shared::{DEFAULT_INSTRUMENT_SUFFIXES, InstrumentNormalizer};

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Where opening quantities come from.
    #[serde(default)]
    pub quantity_source: QuantitySource,
    /// Quantity in fixed mode.
    #[serde(default = "default_one")]
    pub default_quantity: Decimal,
    /// Leverage when the signal carries none.
    #[serde(default = "default_one")]
    pub default_leverage: Decimal,
    /// Where the protection entry price comes from.
    #[serde(default)]
    pub entry_price_source: EntryPriceSource,
    /// Pause after entry before confirming.
    #[serde(default)]
    pub settle_delay_ms: u64,
    /// Suffixes stripped from instrument identifiers.
    #[serde(default = "default_suffixes")]
    pub instrument_suffixes: Vec<String>,
    /// Round derived prices to this many decimals.
    #[serde(default)]
    pub price_decimals: Option<u32>,
    /// One execution at a time per instrument.
    #[serde(default = "default_true")]
    pub serialize_per_instrument: bool,
    /// Position confirmation polling.
    #[serde(default)]
    pub poll: PollConfig,
    /// Stop derivation.
    #[serde(default)]
    pub protection: ProtectionConfig,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            quantity_source: QuantitySource::default(),
            default_quantity: Decimal::ONE,
            default_leverage: Decimal::ONE,
            entry_price_source: EntryPriceSource::default(),
            settle_delay_ms: 0,
            instrument_suffixes: default_suffixes(),
            price_decimals: None,
            serialize_per_instrument: true,
            poll: PollConfig::default(),
            protection: ProtectionConfig::default(),
        }
    }
}

impl ExecutionConfig {
    /// Build the runtime profile.
    #[must_use]
    pub fn to_profile(&self) -> ExecutionProfile {
        let protection = &self.protection;
        ExecutionProfile {
            quantity_source: self.quantity_source,
            default_quantity: self.default_quantity,
            default_leverage: self.default_leverage,
            entry_price_source: self.entry_price_source,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            poll: self.poll.to_policy(),
            protection: ProtectionSettings {
                percent_mode: protection.percent_mode,
                tp_percent: protection.tp_percent,
                sl_percent: protection.sl_percent,
                trigger_by: protection.trigger_by,
                tpsl_mode: protection.tpsl_mode,
                limit_orders: protection.limit_orders,
                limit_slippage_percent: protection.limit_slippage_percent,
                price_decimals: self.price_decimals,
            },
            on_protection_failure: protection.on_failure,
            serialize_per_instrument: self.serialize_per_instrument,
        }
    }

    /// Instrument normalizer for the configured suffixes.
    #[must_use]
    pub fn normalizer(&self) -> InstrumentNormalizer {
        InstrumentNormalizer::new(&self.instrument_suffixes)
    }
}

/// Delay growth between polls, as written in YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// Constant delay.
    #[default]
    Fixed,
    /// Multiplied delay, capped.
    Exponential,
}

/// Polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of polls.
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,
    /// Delay between polls.
    #[serde(default = "default_poll_delay_ms")]
    pub delay_ms: u64,
    /// Delay growth.
    #[serde(default)]
    pub backoff: BackoffKind,
    /// Growth factor for exponential backoff.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Cap on a single delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_poll_attempts(),
            delay_ms: default_poll_delay_ms(),
            backoff: BackoffKind::default(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl PollConfig {
    /// Convert to the confirmer policy.
    #[must_use]
    pub const fn to_policy(&self) -> PollPolicy {
        let backoff = match self.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                multiplier: self.multiplier,
                max_delay: Duration::from_millis(self.max_delay_ms),
            },
        };
        PollPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
            backoff,
        }
    }
}

/// Protection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionConfig {
    /// `price` or `margin`.
    #[serde(default)]
    pub percent_mode: PercentMode,
    /// Take-profit percent used when the signal carries none.
    #[serde(default)]
    pub tp_percent: Option<Decimal>,
    /// Stop-loss percent used when the signal carries none.
    #[serde(default)]
    pub sl_percent: Option<Decimal>,
    /// Trigger price series.
    #[serde(default)]
    pub trigger_by: TriggerReference,
    /// Full or partial coverage.
    #[serde(default)]
    pub tpsl_mode: TpSlMode,
    /// Execute legs as limit orders.
    #[serde(default)]
    pub limit_orders: bool,
    /// Limit offset from the trigger, in percent.
    #[serde(default = "default_slippage")]
    pub limit_slippage_percent: Decimal,
    /// What to do when stops cannot be attached.
    #[serde(default)]
    pub on_failure: ProtectionFailurePolicy,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            percent_mode: PercentMode::default(),
            tp_percent: None,
            sl_percent: None,
            trigger_by: TriggerReference::default(),
            tpsl_mode: TpSlMode::default(),
            limit_orders: false,
            limit_slippage_percent: default_slippage(),
            on_failure: ProtectionFailurePolicy::default(),
        }
    }
}

const fn default_one() -> Decimal {
    Decimal::ONE
}

const fn default_true() -> bool {
    true
}

fn default_suffixes() -> Vec<String> {
    DEFAULT_INSTRUMENT_SUFFIXES
        .iter()
        .map(|suffix| (*suffix).to_string())
        .collect()
}

const fn default_poll_attempts() -> u32 {
    10
}

const fn default_poll_delay_ms() -> u64 {
    1000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_max_delay_ms() -> u64 {
    10_000
}

const fn default_slippage() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 1)
}
