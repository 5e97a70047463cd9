//! HTTP request DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::signal::RawSignal;

/// A JSON scalar that may arrive as a number or a numeric string.
///
/// Alert templates quote placeholders, so `"0.01"` and `0.01` must both be
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    /// JSON number.
    Number(serde_json::Number),
    /// JSON string.
    Text(String),
}

impl NumberOrString {
    /// Text form, preserving the number as written.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

/// Inbound webhook payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookRequest {
    /// Shared secret.
    #[serde(default, alias = "passphrase")]
    pub secret: Option<String>,
    /// Instrument symbol, possibly prefixed or suffixed.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Action string.
    #[serde(default)]
    pub action: Option<String>,
    /// Order quantity.
    #[serde(default, alias = "qty")]
    pub quantity: Option<NumberOrString>,
    /// Leverage.
    #[serde(default)]
    pub leverage: Option<NumberOrString>,
    /// Entry price.
    #[serde(default)]
    pub entry_price: Option<NumberOrString>,
    /// Absolute take-profit price.
    #[serde(default, alias = "take_profit_price")]
    pub tp: Option<NumberOrString>,
    /// Absolute stop-loss price.
    #[serde(default, alias = "stop_loss_price")]
    pub sl: Option<NumberOrString>,
    /// Take-profit distance in percent.
    #[serde(default)]
    pub tp_percent: Option<NumberOrString>,
    /// Stop-loss distance in percent.
    #[serde(default)]
    pub sl_percent: Option<NumberOrString>,
    /// Free-text note.
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<WebhookRequest> for RawSignal {
    fn from(request: WebhookRequest) -> Self {
        let text = |value: Option<NumberOrString>| value.map(NumberOrString::into_text);
        Self {
            secret: request.secret,
            symbol: request.symbol,
            action: request.action,
            quantity: text(request.quantity),
            leverage: text(request.leverage),
            entry_price: text(request.entry_price),
            take_profit: text(request.tp),
            stop_loss: text(request.sl),
            tp_percent: text(request.tp_percent),
            sl_percent: text(request.sl_percent),
            comment: request.comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numbers_and_strings() {
        let request: WebhookRequest = serde_json::from_value(json!({
            "secret": "ok",
            "symbol": "BTCUSDT.P",
            "action": "buy",
            "quantity": "0.01",
            "leverage": 20,
            "entry_price": 64012.5
        }))
        .unwrap();

        let raw = RawSignal::from(request);
        assert_eq!(raw.quantity.as_deref(), Some("0.01"));
        assert_eq!(raw.leverage.as_deref(), Some("20"));
        assert_eq!(raw.entry_price.as_deref(), Some("64012.5"));
    }

    #[test]
    fn accepts_field_aliases() {
        let request: WebhookRequest = serde_json::from_value(json!({
            "passphrase": "ok",
            "symbol": "ETHUSDT",
            "action": "sell",
            "qty": 2,
            "take_profit_price": "1800",
            "stop_loss_price": "2100"
        }))
        .unwrap();

        let raw = RawSignal::from(request);
        assert_eq!(raw.secret.as_deref(), Some("ok"));
        assert_eq!(raw.quantity.as_deref(), Some("2"));
        assert_eq!(raw.take_profit.as_deref(), Some("1800"));
        assert_eq!(raw.stop_loss.as_deref(), Some("2100"));
    }

    #[test]
    fn missing_fields_stay_empty() {
        let request: WebhookRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(RawSignal::from(request), RawSignal::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let request: WebhookRequest = serde_json::from_value(json!({
            "action": "buy",
            "exchange": "BYBIT",
            "time": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(request.action.as_deref(), Some("buy"));
    }
}
