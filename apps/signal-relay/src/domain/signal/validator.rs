//! Signal Validator
//!
//! Authenticates and parses a [`RawSignal`] into a [`Signal`]. Pure: the
//! only inputs are the payload and the validator's configuration.
//!
//! Check order:
//! 1. Shared secret (any mismatch is `Unauthorized`, whatever else is wrong)
//! 2. Action (unsupported actions are `Ignored`, not an error)
//! 3. Symbol (required, normalized)
//! 4. Numeric fields (must parse, must be in range)

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use super::action::SignalAction;
use super::errors::SignalRejection;
use super::raw::RawSignal;
use crate::domain::shared::{Instrument, InstrumentNormalizer};

/// A validated, immutable trade signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    /// Normalized instrument.
    pub instrument: Instrument,
    /// Recognized action.
    pub action: SignalAction,
    /// Quantity from the signal, if any.
    pub quantity: Option<Decimal>,
    /// Leverage from the signal, if any.
    pub leverage: Option<Decimal>,
    /// Entry price from the signal, if any.
    pub entry_price: Option<Decimal>,
    /// Absolute take-profit price.
    pub take_profit_price: Option<Decimal>,
    /// Absolute stop-loss price.
    pub stop_loss_price: Option<Decimal>,
    /// Take-profit distance in percent.
    pub tp_percent: Option<Decimal>,
    /// Stop-loss distance in percent.
    pub sl_percent: Option<Decimal>,
    /// Free-text note.
    pub comment: Option<String>,
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Authenticated signal with a supported action.
    Accepted(Signal),
    /// Authenticated signal whose action the relay does not handle.
    Ignored {
        /// The action as received.
        action: String,
    },
}

/// Authenticates and parses inbound signals.
#[derive(Debug, Clone)]
pub struct SignalValidator {
    shared_secret: String,
    normalizer: InstrumentNormalizer,
    require_quantity: bool,
}

impl SignalValidator {
    /// Create a validator for the given shared secret.
    #[must_use]
    pub fn new(shared_secret: impl Into<String>, normalizer: InstrumentNormalizer) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            normalizer,
            require_quantity: false,
        }
    }

    /// Require opening signals to carry their own quantity.
    #[must_use]
    pub const fn with_required_quantity(mut self, required: bool) -> Self {
        self.require_quantity = required;
        self
    }

    /// Instrument normalizer in use.
    #[must_use]
    pub const fn normalizer(&self) -> &InstrumentNormalizer {
        &self.normalizer
    }

    /// Validate a raw signal.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` on a bad secret and `InvalidPayload` when a
    /// field is missing or malformed.
    pub fn validate(&self, raw: &RawSignal) -> Result<Validation, SignalRejection> {
        let secret = raw.secret.as_deref().unwrap_or_default();
        if self.shared_secret.is_empty() || !secrets_match(secret, &self.shared_secret) {
            return Err(SignalRejection::Unauthorized);
        }

        let action_raw = raw
            .action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| SignalRejection::invalid("action", "is required"))?;

        let Some(action) = SignalAction::parse(action_raw) else {
            return Ok(Validation::Ignored {
                action: action_raw.to_string(),
            });
        };

        let symbol = raw
            .symbol
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SignalRejection::invalid("symbol", "is required"))?;
        let instrument = self
            .normalizer
            .parse(symbol)
            .map_err(|e| SignalRejection::invalid("symbol", e.to_string()))?;

        let quantity = parse_positive("quantity", raw.quantity.as_deref())?;
        if self.require_quantity && action.is_entry() && quantity.is_none() {
            return Err(SignalRejection::invalid("quantity", "is required"));
        }

        let leverage = parse_positive("leverage", raw.leverage.as_deref())?;
        if leverage.is_some_and(|lev| lev < Decimal::ONE) {
            return Err(SignalRejection::invalid("leverage", "must be at least 1"));
        }

        Ok(Validation::Accepted(Signal {
            instrument,
            action,
            quantity,
            leverage,
            entry_price: parse_positive("entry_price", raw.entry_price.as_deref())?,
            take_profit_price: parse_positive("tp", raw.take_profit.as_deref())?,
            stop_loss_price: parse_positive("sl", raw.stop_loss.as_deref())?,
            tp_percent: parse_non_negative("tp_percent", raw.tp_percent.as_deref())?,
            sl_percent: parse_non_negative("sl_percent", raw.sl_percent.as_deref())?,
            comment: raw
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string),
        }))
    }
}

fn parse_decimal(field: &str, value: Option<&str>) -> Result<Option<Decimal>, SignalRejection> {
    let Some(text) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(|d| Some(d.normalize()))
        .map_err(|_| SignalRejection::invalid(field, format!("'{text}' is not a number")))
}

fn parse_non_negative(
    field: &str,
    value: Option<&str>,
) -> Result<Option<Decimal>, SignalRejection> {
    let parsed = parse_decimal(field, value)?;
    if parsed.is_some_and(|d| d.is_sign_negative() && !d.is_zero()) {
        return Err(SignalRejection::invalid(field, "must not be negative"));
    }
    Ok(parsed)
}

fn parse_positive(field: &str, value: Option<&str>) -> Result<Option<Decimal>, SignalRejection> {
    let parsed = parse_non_negative(field, value)?;
    if parsed.is_some_and(|d| d.is_zero()) {
        return Err(SignalRejection::invalid(field, "must be greater than zero"));
    }
    Ok(parsed)
}

/// Length-independent comparison of the supplied and configured secrets.
fn secrets_match(supplied: &str, expected: &str) -> bool {
    let supplied = supplied.as_bytes();
    let expected = expected.as_bytes();
    let mut diff = supplied.len() ^ expected.len();
    for (i, byte) in expected.iter().enumerate() {
        let other = supplied.get(i).copied().unwrap_or(0);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}
