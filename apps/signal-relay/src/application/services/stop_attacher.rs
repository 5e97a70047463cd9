//! Stop Attacher
//!
//! Submits the derived take-profit / stop-loss in a single request. Not
//! retried: a failure leaves the position open and unprotected, and the
//! orchestrator decides what happens next.

use std::sync::Arc;
use std::time::Instant;

use super::record_call;
use crate::application::errors::StopError;
use crate::application::ports::ExchangeGateway;
use crate::domain::protection::ProtectionOrder;

/// Attaches protective stops to open positions.
pub struct StopAttacher<G: ExchangeGateway> {
    gateway: Arc<G>,
}

impl<G: ExchangeGateway> StopAttacher<G> {
    /// Create a new attacher.
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Attach `order` to its instrument's position.
    ///
    /// # Errors
    ///
    /// Returns [`StopError`] on any gateway failure.
    pub async fn attach_stops(&self, order: &ProtectionOrder) -> Result<(), StopError> {
        let started = Instant::now();
        let result = self.gateway.set_protective_stop(order).await;
        record_call("set_protective_stop", started, &result);

        let take_profit = order.take_profit.map(|leg| leg.trigger);
        let stop_loss = order.stop_loss.map(|leg| leg.trigger);

        match result {
            Ok(()) => {
                tracing::info!(
                    instrument = %order.instrument,
                    take_profit = ?take_profit,
                    stop_loss = ?stop_loss,
                    trigger_by = %order.trigger_by,
                    mode = %order.mode,
                    "Protective stops attached"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    instrument = %order.instrument,
                    take_profit = ?take_profit,
                    stop_loss = ?stop_loss,
                    kind = %e.kind,
                    code = ?e.code,
                    error = %e.message,
                    "Protective stops rejected"
                );
                Err(StopError(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GatewayErrorKind;
    use crate::application::testing::{FakeGateway, error};
    use crate::domain::protection::{PriceLeg, TpSlMode, TriggerReference};
    use crate::domain::shared::{Instrument, Side};
    use rust_decimal_macros::dec;

    fn order() -> ProtectionOrder {
        ProtectionOrder {
            instrument: Instrument::new("BTCUSDT"),
            position_side: Side::Buy,
            take_profit: Some(PriceLeg::market(dec!(100.215))),
            stop_loss: Some(PriceLeg::market(dec!(99.95))),
            trigger_by: TriggerReference::LastPrice,
            mode: TpSlMode::Full,
            size: None,
        }
    }

    #[tokio::test]
    async fn attaches_once() {
        let gateway = Arc::new(FakeGateway::new());
        StopAttacher::new(Arc::clone(&gateway))
            .attach_stops(&order())
            .await
            .unwrap();
        assert_eq!(gateway.call_names(), vec!["set_protective_stop"]);
    }

    #[tokio::test]
    async fn failure_is_not_retried() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_stop(Err(error(GatewayErrorKind::Rejected)));

        let err = StopAttacher::new(Arc::clone(&gateway))
            .attach_stops(&order())
            .await
            .unwrap_err();

        assert_eq!(err.0.kind, GatewayErrorKind::Rejected);
        assert_eq!(gateway.call_names(), vec!["set_protective_stop"]);
    }
}
