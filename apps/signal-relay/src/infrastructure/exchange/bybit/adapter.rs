//! Bybit gateway adapter implementing ExchangeGateway.

use async_trait::async_trait;

use crate::application::ports::{
    ExchangeGateway, GatewayError, LeverageRequest, OrderAck, OrderRequest, PositionSnapshot,
};
use crate::domain::protection::ProtectionOrder;
use crate::domain::shared::Instrument;

use super::api_types::{
    CreateOrderBody, CreateOrderResult, PositionList, SetLeverageBody, TradingStopBody,
};
use super::config::{BybitConfig, BybitEnvironment};
use super::error::BybitError;
use super::http_client::BybitHttpClient;

const SET_LEVERAGE_PATH: &str = "/v5/position/set-leverage";
const CREATE_ORDER_PATH: &str = "/v5/order/create";
const POSITION_LIST_PATH: &str = "/v5/position/list";
const TRADING_STOP_PATH: &str = "/v5/position/trading-stop";

/// Bybit V5 gateway adapter.
///
/// Implements `ExchangeGateway` for one product category.
#[derive(Debug, Clone)]
pub struct BybitGatewayAdapter {
    client: BybitHttpClient,
    category: String,
    environment: BybitEnvironment,
}

impl BybitGatewayAdapter {
    /// Create a new Bybit gateway adapter.
    pub fn new(config: BybitConfig) -> Result<Self, BybitError> {
        let client = BybitHttpClient::new(&config)?;
        Ok(Self {
            client,
            category: config.category,
            environment: config.environment,
        })
    }

    /// Check if we're trading on mainnet.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.environment.is_live()
    }

    /// Environment the adapter talks to.
    #[must_use]
    pub const fn environment(&self) -> BybitEnvironment {
        self.environment
    }
}

#[async_trait]
impl ExchangeGateway for BybitGatewayAdapter {
    async fn set_leverage(&self, request: &LeverageRequest) -> Result<(), GatewayError> {
        let body = SetLeverageBody::new(&self.category, request);

        tracing::debug!(
            symbol = %body.symbol,
            buy_leverage = %body.buy_leverage,
            sell_leverage = %body.sell_leverage,
            "Setting leverage"
        );

        let _: serde_json::Value = self
            .client
            .post(SET_LEVERAGE_PATH, &body)
            .await
            .map_err(GatewayError::from)?;
        Ok(())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, GatewayError> {
        if self.is_live() {
            tracing::warn!(
                order_link_id = %request.client_order_id,
                symbol = %request.instrument,
                "Submitting MAINNET order - this will execute real trades"
            );
        }

        let body = CreateOrderBody::new(&self.category, request);

        tracing::info!(
            order_link_id = %body.order_link_id,
            symbol = %body.symbol,
            side = %body.side,
            order_type = %body.order_type,
            qty = %body.qty,
            reduce_only = body.reduce_only,
            "Submitting order to Bybit"
        );

        let result: CreateOrderResult = self
            .client
            .post(CREATE_ORDER_PATH, &body)
            .await
            .map_err(GatewayError::from)?;

        let mut ack = OrderAck::from(result);
        if ack.client_order_id.is_empty() {
            ack.client_order_id.clone_from(&request.client_order_id);
        }
        Ok(ack)
    }

    async fn get_position(
        &self,
        instrument: &Instrument,
    ) -> Result<Option<PositionSnapshot>, GatewayError> {
        let positions: PositionList = self
            .client
            .get(
                POSITION_LIST_PATH,
                &[
                    ("category", self.category.as_str()),
                    ("symbol", instrument.as_str()),
                ],
            )
            .await
            .map_err(GatewayError::from)?;

        let entries = positions
            .list
            .iter()
            .filter(|info| info.symbol.eq_ignore_ascii_case(instrument.as_str()))
            .map(|info| info.to_snapshot().map_err(GatewayError::from))
            .collect::<Result<Vec<_>, _>>()?;

        // Hedge mode reports one entry per side; prefer the open one.
        let snapshot = entries
            .iter()
            .find(|snapshot| !snapshot.is_flat())
            .or_else(|| entries.first())
            .cloned();

        tracing::debug!(
            symbol = %instrument,
            side = ?snapshot.as_ref().and_then(|s| s.side),
            size = ?snapshot.as_ref().map(|s| s.size),
            "Position read"
        );

        Ok(snapshot)
    }

    async fn set_protective_stop(&self, order: &ProtectionOrder) -> Result<(), GatewayError> {
        let body = TradingStopBody::new(&self.category, order);

        tracing::info!(
            symbol = %body.symbol,
            take_profit = ?body.take_profit,
            stop_loss = ?body.stop_loss,
            tpsl_mode = %body.tpsl_mode,
            "Setting trading stop"
        );

        let _: serde_json::Value = self
            .client
            .post(TRADING_STOP_PATH, &body)
            .await
            .map_err(GatewayError::from)?;
        Ok(())
    }
}
