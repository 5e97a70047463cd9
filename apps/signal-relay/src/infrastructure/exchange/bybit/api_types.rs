//! Bybit V5 request and response types.
//!
//! These types map directly to the V5 REST format. Numbers travel as
//! strings in both directions.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LeverageRequest, OrderAck, OrderRequest, PositionSnapshot};
use crate::domain::protection::ProtectionOrder;
use crate::domain::shared::{Instrument, Side};

use super::error::BybitError;

// ============================================================================
// Envelope
// ============================================================================

/// Every V5 response is wrapped in this envelope.
///
/// The payload stays untyped until `retCode` is checked, since error
/// responses carry an empty object in its place.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Zero on success.
    pub ret_code: i64,
    /// Human readable status.
    #[serde(default)]
    pub ret_msg: String,
    /// Payload.
    #[serde(default)]
    pub result: serde_json::Value,
}

impl Envelope {
    /// Decode the payload, turning a non-zero `retCode` into an error.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, BybitError> {
        if self.ret_code != 0 {
            return Err(BybitError::Api {
                code: self.ret_code,
                message: self.ret_msg,
            });
        }
        serde_json::from_value(self.result).map_err(|e| BybitError::JsonParse(e.to_string()))
    }
}

fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

// ============================================================================
// Leverage
// ============================================================================

/// `POST /v5/position/set-leverage` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLeverageBody {
    /// Product category.
    pub category: String,
    /// Venue symbol.
    pub symbol: String,
    /// Leverage for the long side.
    pub buy_leverage: String,
    /// Leverage for the short side.
    pub sell_leverage: String,
}

impl SetLeverageBody {
    /// Build from the port request.
    #[must_use]
    pub fn new(category: &str, request: &LeverageRequest) -> Self {
        Self {
            category: category.to_string(),
            symbol: request.instrument.as_str().to_string(),
            buy_leverage: format_decimal(request.buy_leverage),
            sell_leverage: format_decimal(request.sell_leverage),
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

/// `POST /v5/order/create` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    /// Product category.
    pub category: String,
    /// Venue symbol.
    pub symbol: String,
    /// `Buy` or `Sell`.
    pub side: String,
    /// `Market`.
    pub order_type: String,
    /// Order quantity in base units.
    pub qty: String,
    /// Only reduce an existing position.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reduce_only: bool,
    /// Client correlation ID.
    pub order_link_id: String,
}

impl CreateOrderBody {
    /// Build from the port request.
    #[must_use]
    pub fn new(category: &str, request: &OrderRequest) -> Self {
        Self {
            category: category.to_string(),
            symbol: request.instrument.as_str().to_string(),
            side: request.side.to_string(),
            order_type: request.order_type.as_str().to_string(),
            qty: format_decimal(request.quantity),
            reduce_only: request.reduce_only,
            order_link_id: request.client_order_id.clone(),
        }
    }
}

/// `order/create` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResult {
    /// Venue order ID.
    pub order_id: String,
    /// Echo of the client correlation ID.
    #[serde(default)]
    pub order_link_id: String,
}

impl From<CreateOrderResult> for OrderAck {
    fn from(result: CreateOrderResult) -> Self {
        Self {
            order_id: result.order_id,
            client_order_id: result.order_link_id,
        }
    }
}

// ============================================================================
// Positions
// ============================================================================

/// `GET /v5/position/list` result.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionList {
    /// Position entries; one per side in hedge mode.
    #[serde(default)]
    pub list: Vec<PositionInfo>,
}

/// One position entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    /// Venue symbol.
    pub symbol: String,
    /// `Buy`, `Sell`, or empty / `None` when flat.
    #[serde(default)]
    pub side: String,
    /// Absolute position size.
    #[serde(default)]
    pub size: String,
    /// Average entry price.
    #[serde(default)]
    pub avg_price: String,
}

impl PositionInfo {
    /// Convert into the port snapshot.
    ///
    /// A size or price that is present but not a number is a malformed
    /// response, never a flat position.
    pub fn to_snapshot(&self) -> Result<PositionSnapshot, BybitError> {
        let side = match self.side.as_str() {
            "Buy" => Some(Side::Buy),
            "Sell" => Some(Side::Sell),
            "" | "None" => None,
            other => {
                return Err(BybitError::JsonParse(format!(
                    "unexpected position side '{other}'"
                )));
            }
        };
        let size = parse_decimal("size", &self.size)?.unwrap_or(Decimal::ZERO);
        let average_entry_price =
            parse_decimal("avgPrice", &self.avg_price)?.filter(|price| *price > Decimal::ZERO);

        Ok(PositionSnapshot {
            instrument: Instrument::new(&self.symbol),
            side,
            size,
            average_entry_price,
        })
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<Option<Decimal>, BybitError> {
    if raw.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(Some)
        .map_err(|e| BybitError::JsonParse(format!("{field} '{raw}': {e}")))
}

// ============================================================================
// Trading stop
// ============================================================================

/// `POST /v5/position/trading-stop` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingStopBody {
    /// Product category.
    pub category: String,
    /// Venue symbol.
    pub symbol: String,
    /// `Full` or `Partial`.
    pub tpsl_mode: String,
    /// Zero in one-way mode.
    pub position_idx: u8,
    /// Take-profit trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<String>,
    /// Stop-loss trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<String>,
    /// Take-profit trigger reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_trigger_by: Option<String>,
    /// Stop-loss trigger reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_trigger_by: Option<String>,
    /// `Market` or `Limit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_order_type: Option<String>,
    /// `Market` or `Limit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_order_type: Option<String>,
    /// Limit price for a limit take-profit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_limit_price: Option<String>,
    /// Limit price for a limit stop-loss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_limit_price: Option<String>,
    /// Partial take-profit size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_size: Option<String>,
    /// Partial stop-loss size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_size: Option<String>,
}

impl TradingStopBody {
    /// Build from a protection order.
    #[must_use]
    pub fn new(category: &str, order: &ProtectionOrder) -> Self {
        let trigger_by = || Some(order.trigger_by.as_str().to_string());
        let order_type = |limit: Option<Decimal>| {
            Some(if limit.is_some() { "Limit" } else { "Market" }.to_string())
        };
        let size = order.size.map(format_decimal);

        let mut body = Self {
            category: category.to_string(),
            symbol: order.instrument.as_str().to_string(),
            tpsl_mode: order.mode.as_str().to_string(),
            position_idx: 0,
            take_profit: None,
            stop_loss: None,
            tp_trigger_by: None,
            sl_trigger_by: None,
            tp_order_type: None,
            sl_order_type: None,
            tp_limit_price: None,
            sl_limit_price: None,
            tp_size: None,
            sl_size: None,
        };

        if let Some(leg) = order.take_profit {
            body.take_profit = Some(format_decimal(leg.trigger));
            body.tp_trigger_by = trigger_by();
            body.tp_order_type = order_type(leg.limit);
            body.tp_limit_price = leg.limit.map(format_decimal);
            body.tp_size.clone_from(&size);
        }
        if let Some(leg) = order.stop_loss {
            body.stop_loss = Some(format_decimal(leg.trigger));
            body.sl_trigger_by = trigger_by();
            body.sl_order_type = order_type(leg.limit);
            body.sl_limit_price = leg.limit.map(format_decimal);
            body.sl_size.clone_from(&size);
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::protection::{PriceLeg, TpSlMode, TriggerReference};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn envelope_success() {
        let envelope: Envelope = serde_json::from_value(json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {"orderId": "1321003749386327552", "orderLinkId": "link-1"},
            "time": 1_672_211_918_471_i64
        }))
        .unwrap();
        let ack: OrderAck = envelope.into_result::<CreateOrderResult>().unwrap().into();
        assert_eq!(ack.order_id, "1321003749386327552");
        assert_eq!(ack.client_order_id, "link-1");
    }

    #[test]
    fn envelope_error_code() {
        let envelope: Envelope = serde_json::from_value(json!({
            "retCode": 110_043,
            "retMsg": "leverage not modified",
            "result": {}
        }))
        .unwrap();
        let err = envelope.into_result::<CreateOrderResult>().unwrap_err();
        assert!(matches!(err, BybitError::Api { code: 110_043, .. }));
    }

    #[test]
    fn leverage_body_uses_plain_numbers() {
        let body = SetLeverageBody::new(
            "linear",
            &LeverageRequest::symmetric(Instrument::new("BTCUSDT"), dec!(20.00)),
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "category": "linear",
                "symbol": "BTCUSDT",
                "buyLeverage": "20",
                "sellLeverage": "20"
            })
        );
    }

    #[test]
    fn order_body_omits_reduce_only_when_false() {
        let request = OrderRequest::market(Instrument::new("ETHUSDT"), Side::Sell, dec!(0.5));
        let value = serde_json::to_value(CreateOrderBody::new("linear", &request)).unwrap();
        assert_eq!(value["side"], "Sell");
        assert_eq!(value["orderType"], "Market");
        assert_eq!(value["qty"], "0.5");
        assert_eq!(value["orderLinkId"], request.client_order_id.as_str());
        assert!(value.get("reduceOnly").is_none());
    }

    #[test]
    fn close_body_is_reduce_only() {
        let request =
            OrderRequest::market(Instrument::new("ETHUSDT"), Side::Buy, dec!(1)).reduce_only();
        let value = serde_json::to_value(CreateOrderBody::new("linear", &request)).unwrap();
        assert_eq!(value["reduceOnly"], true);
    }

    #[test]
    fn position_snapshot_parses_strings() {
        let info = PositionInfo {
            symbol: "BTCUSDT".to_string(),
            side: "Buy".to_string(),
            size: "0.010".to_string(),
            avg_price: "64012.5".to_string(),
        };
        let snapshot = info.to_snapshot().unwrap();
        assert_eq!(snapshot.side, Some(Side::Buy));
        assert_eq!(snapshot.size, dec!(0.010));
        assert_eq!(snapshot.average_entry_price, Some(dec!(64012.5)));
    }

    #[test]
    fn flat_position_has_no_side() {
        let info = PositionInfo {
            symbol: "BTCUSDT".to_string(),
            side: String::new(),
            size: "0".to_string(),
            avg_price: "0".to_string(),
        };
        let snapshot = info.to_snapshot().unwrap();
        assert!(snapshot.is_flat());
        assert_eq!(snapshot.average_entry_price, None);
    }

    #[test]
    fn garbage_size_is_malformed() {
        let info = PositionInfo {
            symbol: "BTCUSDT".to_string(),
            side: "Buy".to_string(),
            size: "lots".to_string(),
            avg_price: "100".to_string(),
        };
        assert!(matches!(info.to_snapshot(), Err(BybitError::JsonParse(_))));
    }

    #[test]
    fn trading_stop_full_mode() {
        let order = ProtectionOrder {
            instrument: Instrument::new("BTCUSDT"),
            position_side: Side::Buy,
            take_profit: Some(PriceLeg::market(dec!(100.215))),
            stop_loss: Some(PriceLeg::market(dec!(99.95))),
            trigger_by: TriggerReference::MarkPrice,
            mode: TpSlMode::Full,
            size: None,
        };
        assert_eq!(
            serde_json::to_value(TradingStopBody::new("linear", &order)).unwrap(),
            json!({
                "category": "linear",
                "symbol": "BTCUSDT",
                "tpslMode": "Full",
                "positionIdx": 0,
                "takeProfit": "100.215",
                "stopLoss": "99.95",
                "tpTriggerBy": "MarkPrice",
                "slTriggerBy": "MarkPrice",
                "tpOrderType": "Market",
                "slOrderType": "Market"
            })
        );
    }

    #[test]
    fn trading_stop_partial_limit_legs() {
        let order = ProtectionOrder {
            instrument: Instrument::new("BTCUSDT"),
            position_side: Side::Buy,
            take_profit: Some(PriceLeg::limit(dec!(110), dec!(109.89))),
            stop_loss: None,
            trigger_by: TriggerReference::LastPrice,
            mode: TpSlMode::Partial,
            size: Some(dec!(0.5)),
        };
        let value = serde_json::to_value(TradingStopBody::new("linear", &order)).unwrap();
        assert_eq!(value["tpslMode"], "Partial");
        assert_eq!(value["tpOrderType"], "Limit");
        assert_eq!(value["tpLimitPrice"], "109.89");
        assert_eq!(value["tpSize"], "0.5");
        assert!(value.get("stopLoss").is_none());
        assert!(value.get("slSize").is_none());
    }
}
