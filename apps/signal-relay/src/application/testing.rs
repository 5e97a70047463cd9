//! Scripted in-memory gateway for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{
    ExchangeGateway, GatewayError, GatewayErrorKind, LeverageRequest, OrderAck, OrderRequest,
    PositionSnapshot,
};
use crate::domain::protection::ProtectionOrder;
use crate::domain::shared::{Instrument, Side};

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    SetLeverage(LeverageRequest),
    PlaceOrder(OrderRequest),
    GetPosition(Instrument),
    SetProtectiveStop(ProtectionOrder),
}

impl GatewayCall {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetLeverage(_) => "set_leverage",
            Self::PlaceOrder(_) => "place_order",
            Self::GetPosition(_) => "get_position",
            Self::SetProtectiveStop(_) => "set_protective_stop",
        }
    }
}

/// Gateway that replays queued responses and records every call.
///
/// Empty queues fall back to success (no position for `get_position`).
#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<GatewayCall>>,
    leverage: Mutex<VecDeque<Result<(), GatewayError>>>,
    orders: Mutex<VecDeque<Result<OrderAck, GatewayError>>>,
    positions: Mutex<VecDeque<Result<Option<PositionSnapshot>, GatewayError>>>,
    stops: Mutex<VecDeque<Result<(), GatewayError>>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_leverage(&self, result: Result<(), GatewayError>) -> &Self {
        self.leverage.lock().unwrap().push_back(result);
        self
    }

    pub fn push_order(&self, result: Result<OrderAck, GatewayError>) -> &Self {
        self.orders.lock().unwrap().push_back(result);
        self
    }

    pub fn push_position(&self, result: Result<Option<PositionSnapshot>, GatewayError>) -> &Self {
        self.positions.lock().unwrap().push_back(result);
        self
    }

    pub fn push_stop(&self, result: Result<(), GatewayError>) -> &Self {
        self.stops.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(GatewayCall::name).collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn error(kind: GatewayErrorKind) -> GatewayError {
    GatewayError::new(kind, format!("{kind} from fake"))
}

pub fn open_position(instrument: &str, side: Side, size: Decimal, price: Decimal) -> PositionSnapshot {
    PositionSnapshot {
        instrument: Instrument::new(instrument),
        side: Some(side),
        size,
        average_entry_price: Some(price),
    }
}

pub fn flat_position(instrument: &str) -> PositionSnapshot {
    PositionSnapshot {
        instrument: Instrument::new(instrument),
        side: None,
        size: Decimal::ZERO,
        average_entry_price: None,
    }
}

#[async_trait]
impl ExchangeGateway for FakeGateway {
    async fn set_leverage(&self, request: &LeverageRequest) -> Result<(), GatewayError> {
        self.record(GatewayCall::SetLeverage(request.clone()));
        self.leverage.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, GatewayError> {
        self.record(GatewayCall::PlaceOrder(request.clone()));
        let count = self.calls.lock().unwrap().len();
        self.orders.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(OrderAck {
                order_id: format!("order-{count}"),
                client_order_id: request.client_order_id.clone(),
            })
        })
    }

    async fn get_position(
        &self,
        instrument: &Instrument,
    ) -> Result<Option<PositionSnapshot>, GatewayError> {
        self.record(GatewayCall::GetPosition(instrument.clone()));
        self.positions.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn set_protective_stop(&self, order: &ProtectionOrder) -> Result<(), GatewayError> {
        self.record(GatewayCall::SetProtectiveStop(order.clone()));
        self.stops.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}
