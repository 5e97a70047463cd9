//! Order Executor
//!
//! Sends market orders exactly once. A duplicate fill is worse than a
//! missed signal, so nothing here retries.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;

use super::record_call;
use crate::application::errors::OrderError;
use crate::application::ports::{ExchangeGateway, OrderAck, OrderRequest};
use crate::domain::shared::{Instrument, Side};

/// Submits entry and closing orders.
pub struct OrderExecutor<G: ExchangeGateway> {
    gateway: Arc<G>,
}

impl<G: ExchangeGateway> OrderExecutor<G> {
    /// Create a new executor.
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Submit the market entry order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] on any gateway failure.
    pub async fn submit_entry(
        &self,
        instrument: &Instrument,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderAck, OrderError> {
        let request = OrderRequest::market(instrument.clone(), side, quantity);
        self.submit(request).await
    }

    /// Submit a reduce-only market order closing `quantity` of a position
    /// held on `position_side`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] on any gateway failure.
    pub async fn submit_close(
        &self,
        instrument: &Instrument,
        position_side: Side,
        quantity: Decimal,
    ) -> Result<OrderAck, OrderError> {
        let request =
            OrderRequest::market(instrument.clone(), position_side.opposite(), quantity)
                .reduce_only();
        self.submit(request).await
    }

    async fn submit(&self, request: OrderRequest) -> Result<OrderAck, OrderError> {
        let started = Instant::now();
        let result = self.gateway.place_order(&request).await;
        record_call("place_order", started, &result);

        match result {
            Ok(ack) => {
                tracing::info!(
                    instrument = %request.instrument,
                    side = %request.side,
                    quantity = %request.quantity,
                    reduce_only = request.reduce_only,
                    order_id = %ack.order_id,
                    order_link_id = %ack.client_order_id,
                    "Order accepted"
                );
                Ok(ack)
            }
            Err(e) => {
                tracing::error!(
                    instrument = %request.instrument,
                    side = %request.side,
                    quantity = %request.quantity,
                    reduce_only = request.reduce_only,
                    kind = %e.kind,
                    code = ?e.code,
                    error = %e.message,
                    "Order rejected"
                );
                Err(OrderError(e))
            }
        }
    }
}
