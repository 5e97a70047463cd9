//! Execute Signal Use Case
//!
//! The execution orchestrator. Sequences validation, leverage, entry,
//! position confirmation, protection derivation and stop attachment for one
//! signal, and owns the failure policy at every step. Prior steps are never
//! rolled back implicitly; the only compensating action is the configured
//! close after a protection failure.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::Instrument as _;
use uuid::Uuid;

use crate::application::errors::ExecutionFailure;
use crate::application::ports::ExchangeGateway;
use crate::application::profile::{
    EntryPriceSource, ExecutionProfile, ProtectionFailurePolicy, QuantitySource,
};
use crate::application::services::{
    InstrumentLocks, LeverageConfigurator, OrderExecutor, PositionConfirmer, StopAttacher,
};
use crate::domain::execution::{
    ExecutionDetails, ExecutionResult, ExecutionStage, ExecutionStatus, ExecutionTracker,
};
use crate::domain::protection::{ProtectionCalculator, ProtectionTargets};
use crate::domain::shared::{Instrument, Side};
use crate::domain::signal::{RawSignal, Signal, SignalRejection, SignalValidator, Validation};
use crate::observability::{
    record_signal_outcome, record_signal_received, record_unprotected_position,
};

/// Use case turning one inbound signal into venue operations.
pub struct ExecuteSignalUseCase<G: ExchangeGateway> {
    validator: SignalValidator,
    profile: ExecutionProfile,
    calculator: ProtectionCalculator,
    leverage: LeverageConfigurator<G>,
    orders: OrderExecutor<G>,
    confirmer: PositionConfirmer<G>,
    stops: StopAttacher<G>,
    locks: InstrumentLocks,
}

impl<G: ExchangeGateway> ExecuteSignalUseCase<G> {
    /// Create a new ExecuteSignalUseCase.
    pub fn new(gateway: Arc<G>, validator: SignalValidator, profile: ExecutionProfile) -> Self {
        let validator =
            validator.with_required_quantity(profile.quantity_source == QuantitySource::Signal);
        Self {
            validator,
            calculator: ProtectionCalculator::new(profile.protection.clone()),
            leverage: LeverageConfigurator::new(Arc::clone(&gateway)),
            orders: OrderExecutor::new(Arc::clone(&gateway)),
            confirmer: PositionConfirmer::new(Arc::clone(&gateway)),
            stops: StopAttacher::new(gateway),
            locks: InstrumentLocks::new(),
            profile,
        }
    }

    /// Execution profile in use.
    pub const fn profile(&self) -> &ExecutionProfile {
        &self.profile
    }

    /// Validate and execute a raw signal.
    ///
    /// # Errors
    ///
    /// Returns [`SignalRejection`] when the signal is unauthorized or
    /// malformed. No venue call is made in that case.
    pub async fn handle(&self, raw: RawSignal) -> Result<ExecutionResult, SignalRejection> {
        let validation = match self.validator.validate(&raw) {
            Ok(validation) => validation,
            Err(rejection) => {
                record_signal_outcome("rejected", rejection.reason_label());
                tracing::warn!(
                    error = %rejection,
                    symbol = ?raw.symbol,
                    action = ?raw.action,
                    "Signal rejected"
                );
                return Err(rejection);
            }
        };

        match validation {
            Validation::Ignored { action } => {
                record_signal_received("unsupported");
                record_signal_outcome("ignored", "unsupported_action");
                tracing::info!(%action, symbol = ?raw.symbol, "Unsupported action ignored");
                Ok(ExecutionResult::ignored(format!(
                    "Action '{action}' is not supported; signal ignored"
                )))
            }
            Validation::Accepted(signal) => Ok(self.execute(signal).await),
        }
    }

    /// Execute a validated signal to completion.
    pub async fn execute(&self, signal: Signal) -> ExecutionResult {
        let signal_id = Uuid::new_v4().to_string();
        record_signal_received(signal.action.as_str());

        let span = tracing::info_span!(
            "execute_signal",
            signal_id = %signal_id,
            instrument = %signal.instrument,
            action = %signal.action,
        );

        let result = async {
            tracing::info!(
                quantity = ?signal.quantity,
                leverage = ?signal.leverage,
                entry_price = ?signal.entry_price,
                comment = ?signal.comment,
                "Signal accepted"
            );

            let _guard = if self.profile.serialize_per_instrument {
                Some(self.locks.acquire(&signal.instrument).await)
            } else {
                None
            };

            match signal.action.entry_side() {
                Some(side) => self.open(&signal, side, &signal_id).await,
                None => self.close(&signal, &signal_id).await,
            }
        }
        .instrument(span)
        .await;

        let reason = match (result.status, result.details.as_ref()) {
            (ExecutionStatus::Failed, Some(details)) => details
                .abort_reason
                .map_or("unknown", |reason| reason.as_str()),
            (ExecutionStatus::Ignored, _) => "no_position",
            _ if result.position_unprotected() => "unprotected",
            _ => "none",
        };
        record_signal_outcome(result.status.as_str(), reason);

        result
    }

    async fn open(&self, signal: &Signal, side: Side, signal_id: &str) -> ExecutionResult {
        let instrument = &signal.instrument;
        let quantity = self.profile.entry_quantity(signal.quantity);
        let leverage = self.profile.leverage(signal.leverage);

        let mut tracker = ExecutionTracker::new();
        let mut details = ExecutionDetails {
            signal_id: Some(signal_id.to_string()),
            instrument: Some(instrument.clone()),
            action: Some(signal.action),
            side: Some(side),
            quantity: Some(quantity),
            leverage: Some(leverage),
            ..ExecutionDetails::default()
        };

        // 1. Leverage
        if let Err(e) = self.leverage.ensure_leverage(instrument, leverage).await {
            return abort(tracker, details, e.into());
        }
        advance(&mut tracker, ExecutionStage::LeverageSet);

        // 2. Entry
        match self.orders.submit_entry(instrument, side, quantity).await {
            Ok(ack) => details.order_id = Some(ack.order_id),
            Err(e) => return abort(tracker, details, e.into()),
        }
        advance(&mut tracker, ExecutionStage::Entered);

        if !self.profile.settle_delay.is_zero() {
            tokio::time::sleep(self.profile.settle_delay).await;
        }

        // 3. Confirmation
        let entry_price = match self.resolve_entry_price(signal, side).await {
            Ok(price) => price,
            Err(failure) => {
                details.position_unprotected = true;
                record_unprotected_position(instrument.as_str());
                tracing::error!(
                    %instrument,
                    %side,
                    error = %failure,
                    "Entry order sent but position not confirmed; it may be open WITHOUT protection"
                );
                return abort(tracker, details, failure);
            }
        };
        advance(&mut tracker, ExecutionStage::PositionConfirmed);
        details.entry_price = entry_price;

        let Some(entry_price) = entry_price else {
            return self
                .protection_failed(
                    tracker,
                    details,
                    side,
                    quantity,
                    ExecutionFailure::MissingEntryPrice,
                )
                .await;
        };

        // 4. Protection
        let targets = ProtectionTargets {
            take_profit_price: signal.take_profit_price,
            stop_loss_price: signal.stop_loss_price,
            tp_percent: signal.tp_percent,
            sl_percent: signal.sl_percent,
        };
        let order = match self.calculator.plan(
            instrument,
            side,
            entry_price,
            leverage,
            quantity,
            &targets,
        ) {
            Ok(Some(order)) => order,
            Ok(None) => {
                details.position_unprotected = true;
                record_unprotected_position(instrument.as_str());
                tracing::error!(
                    %instrument,
                    %side,
                    %entry_price,
                    "No take-profit or stop-loss source; position left WITHOUT protection"
                );
                advance(&mut tracker, ExecutionStage::Done);
                details.stage = Some(tracker.stage());
                return ExecutionResult::success(
                    format!(
                        "Opened {} {instrument} qty {quantity}; no protection configured, position is unprotected",
                        side.direction()
                    ),
                    details,
                );
            }
            Err(e) => {
                return self
                    .protection_failed(tracker, details, side, quantity, e.into())
                    .await;
            }
        };
        details.take_profit = order.take_profit.map(|leg| leg.trigger);
        details.stop_loss = order.stop_loss.map(|leg| leg.trigger);

        // 5. Attach
        if let Err(e) = self.stops.attach_stops(&order).await {
            return self
                .protection_failed(tracker, details, side, quantity, e.into())
                .await;
        }
        advance(&mut tracker, ExecutionStage::ProtectionAttached);
        advance(&mut tracker, ExecutionStage::Done);
        details.stage = Some(tracker.stage());

        let message = format!(
            "Opened {} {instrument} qty {quantity} at {entry_price} (TP {}, SL {})",
            side.direction(),
            display_price(details.take_profit),
            display_price(details.stop_loss),
        );
        tracing::info!(%message, "Signal executed");
        ExecutionResult::success(message, details)
    }

    /// Entry price for protection, `None` when neither venue nor signal has one.
    ///
    /// A signal-supplied price skips polling unless the profile demands the
    /// venue's average price.
    async fn resolve_entry_price(
        &self,
        signal: &Signal,
        side: Side,
    ) -> Result<Option<Decimal>, ExecutionFailure> {
        if let (EntryPriceSource::Signal, Some(price)) =
            (self.profile.entry_price_source, signal.entry_price)
        {
            tracing::debug!(%price, "Using signal entry price, confirmation skipped");
            return Ok(Some(price));
        }

        let snapshot = self
            .confirmer
            .await_open(&signal.instrument, side, &self.profile.poll)
            .await?;

        Ok(snapshot
            .average_entry_price
            .filter(|price| *price > Decimal::ZERO)
            .or(signal.entry_price))
    }

    async fn protection_failed(
        &self,
        tracker: ExecutionTracker,
        mut details: ExecutionDetails,
        side: Side,
        size: Decimal,
        failure: ExecutionFailure,
    ) -> ExecutionResult {
        let Some(instrument) = details.instrument.clone() else {
            return abort(tracker, details, failure);
        };

        tracing::error!(
            %instrument,
            %side,
            error = %failure,
            policy = ?self.profile.on_protection_failure,
            "Position is open WITHOUT protection"
        );

        match self.profile.on_protection_failure {
            ProtectionFailurePolicy::LeaveOpen => {
                details.position_unprotected = true;
                record_unprotected_position(instrument.as_str());
            }
            ProtectionFailurePolicy::ClosePosition => {
                match self.orders.submit_close(&instrument, side, size).await {
                    Ok(ack) => {
                        tracing::warn!(
                            %instrument,
                            order_id = %ack.order_id,
                            "Unprotected position closed"
                        );
                        details.compensating_close =
                            Some(format!("position closed by order {}", ack.order_id));
                    }
                    Err(e) => {
                        details.position_unprotected = true;
                        details.compensating_close = Some(format!("close failed: {e}"));
                        record_unprotected_position(instrument.as_str());
                        tracing::error!(
                            %instrument,
                            error = %e,
                            "Compensating close failed; position open WITHOUT protection"
                        );
                    }
                }
            }
        }

        abort(tracker, details, failure)
    }

    async fn close(&self, signal: &Signal, signal_id: &str) -> ExecutionResult {
        let instrument = &signal.instrument;
        let mut tracker = ExecutionTracker::new();
        let mut details = ExecutionDetails {
            signal_id: Some(signal_id.to_string()),
            instrument: Some(instrument.clone()),
            action: Some(signal.action),
            ..ExecutionDetails::default()
        };

        let snapshot = match self.confirmer.snapshot(instrument).await {
            Ok(snapshot) => snapshot,
            Err(e) => return abort(tracker, details, ExecutionFailure::PositionLookup(e)),
        };

        let open = snapshot
            .filter(|position| !position.is_flat())
            .and_then(|position| position.side.map(|side| (side, position.size)));
        let Some((position_side, size)) = open else {
            tracing::info!(%instrument, "No open position to close");
            return ExecutionResult::ignored(format!("No open position on {instrument} to close"));
        };

        if let Some(wanted) = signal
            .action
            .closes_side()
            .filter(|wanted| *wanted != position_side)
        {
            tracing::info!(
                %instrument,
                wanted = wanted.direction(),
                open = position_side.direction(),
                "Open position is on the other side"
            );
            return ExecutionResult::ignored(format!(
                "No open {} position on {instrument} to close",
                wanted.direction()
            ));
        }

        let quantity = signal.quantity.map_or(size, |q| q.min(size));
        details.side = Some(position_side.opposite());
        details.quantity = Some(quantity);

        match self.orders.submit_close(instrument, position_side, quantity).await {
            Ok(ack) => details.order_id = Some(ack.order_id),
            Err(e) => return abort(tracker, details, e.into()),
        }
        advance(&mut tracker, ExecutionStage::Entered);
        advance(&mut tracker, ExecutionStage::Done);
        details.stage = Some(tracker.stage());

        ExecutionResult::success(
            format!(
                "Closed {quantity} of {} position on {instrument}",
                position_side.direction()
            ),
            details,
        )
    }
}

fn advance(tracker: &mut ExecutionTracker, stage: ExecutionStage) {
    if let Err(e) = tracker.advance(stage) {
        tracing::warn!(error = %e, "Unexpected execution transition");
    }
}

fn abort(
    mut tracker: ExecutionTracker,
    mut details: ExecutionDetails,
    failure: ExecutionFailure,
) -> ExecutionResult {
    let reason = failure.abort_reason();
    if let Err(e) = tracker.abort(reason) {
        tracing::warn!(error = %e, "Unexpected execution transition");
    }
    let stage = tracker.aborted_from().unwrap_or(ExecutionStage::Validated);
    details.stage = Some(stage);
    details.abort_reason = Some(reason);

    tracing::error!(
        %reason,
        %stage,
        position_unprotected = details.position_unprotected,
        error = %failure,
        "Execution aborted"
    );

    let instrument = details
        .instrument
        .as_ref()
        .map_or_else(String::new, Instrument::to_string);
    let message = if details.position_unprotected {
        format!(
            "Execution failed after {stage} ({reason}); {instrument} position may be open WITHOUT protection"
        )
    } else if let Some(close) = &details.compensating_close {
        format!("Execution failed after {stage} ({reason}); {close}")
    } else {
        format!("Execution failed after {stage} ({reason})")
    };

    ExecutionResult::failed(message, failure.to_string(), details)
}

fn display_price(price: Option<Decimal>) -> String {
    price.map_or_else(|| "none".to_string(), |p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{GatewayErrorKind, OrderRequest};
    use crate::application::services::PollPolicy;
    use crate::application::testing::{
        FakeGateway, GatewayCall, error, flat_position, open_position,
    };
    use crate::domain::execution::AbortReason;
    use crate::domain::protection::{PercentMode, PriceLeg, ProtectionSettings};
    use crate::domain::shared::InstrumentNormalizer;
    use rust_decimal_macros::dec;

    fn margin_profile() -> ExecutionProfile {
        ExecutionProfile {
            default_quantity: dec!(0.01),
            default_leverage: dec!(10),
            poll: PollPolicy::immediate(3),
            protection: ProtectionSettings {
                percent_mode: PercentMode::Margin,
                tp_percent: Some(dec!(4.3)),
                sl_percent: Some(dec!(1.0)),
                ..ProtectionSettings::default()
            },
            ..ExecutionProfile::default()
        }
    }

    fn use_case(
        gateway: &Arc<FakeGateway>,
        profile: ExecutionProfile,
    ) -> ExecuteSignalUseCase<FakeGateway> {
        ExecuteSignalUseCase::new(
            Arc::clone(gateway),
            SignalValidator::new("ok", InstrumentNormalizer::default()),
            profile,
        )
    }

    fn raw(action: &str) -> RawSignal {
        RawSignal {
            secret: Some("ok".to_string()),
            symbol: Some("BTCUSDT.P".to_string()),
            action: Some(action.to_string()),
            ..RawSignal::default()
        }
    }

    fn buy_at_100() -> RawSignal {
        RawSignal {
            entry_price: Some("100".to_string()),
            leverage: Some("20".to_string()),
            ..raw("buy")
        }
    }

    fn placed_orders(gateway: &FakeGateway) -> Vec<OrderRequest> {
        gateway
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::PlaceOrder(order) => Some(order),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn entry_runs_three_calls_in_order() {
        let gateway = Arc::new(FakeGateway::new());
        let result = use_case(&gateway, margin_profile())
            .handle(buy_at_100())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(
            gateway.call_names(),
            vec!["set_leverage", "place_order", "set_protective_stop"]
        );

        let calls = gateway.calls();
        let GatewayCall::SetProtectiveStop(order) = &calls[2] else {
            panic!("expected protection call");
        };
        assert_eq!(order.instrument.as_str(), "BTCUSDT");
        assert_eq!(order.take_profit, Some(PriceLeg::market(dec!(100.215))));
        assert_eq!(order.stop_loss, Some(PriceLeg::market(dec!(99.95))));

        let details = result.details.unwrap();
        assert_eq!(details.stage, Some(ExecutionStage::Done));
        assert_eq!(details.leverage, Some(dec!(20)));
        assert!(!details.position_unprotected);
    }

    #[tokio::test]
    async fn unauthorized_makes_no_calls() {
        let gateway = Arc::new(FakeGateway::new());
        let mut payload = buy_at_100();
        payload.secret = Some("wrong".to_string());

        let err = use_case(&gateway, margin_profile())
            .handle(payload)
            .await
            .unwrap_err();

        assert_eq!(err, SignalRejection::Unauthorized);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn unsupported_action_makes_no_calls() {
        let gateway = Arc::new(FakeGateway::new());
        let result = use_case(&gateway, margin_profile())
            .handle(raw("rebalance"))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Ignored);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn leverage_already_set_continues() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_leverage(Err(error(GatewayErrorKind::LeverageNotModified)));

        let result = use_case(&gateway, margin_profile())
            .handle(buy_at_100())
            .await
            .unwrap();
        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(gateway.calls().len(), 3);
    }

    #[tokio::test]
    async fn leverage_failure_aborts_before_order() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_leverage(Err(error(GatewayErrorKind::Rejected)));

        let result = use_case(&gateway, margin_profile())
            .handle(buy_at_100())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(gateway.call_names(), vec!["set_leverage"]);
        let details = result.details.unwrap();
        assert_eq!(details.abort_reason, Some(AbortReason::Leverage));
        assert_eq!(details.stage, Some(ExecutionStage::Validated));
        assert!(!details.position_unprotected);
    }

    #[tokio::test]
    async fn order_failure_aborts() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_order(Err(error(GatewayErrorKind::InsufficientBalance)));

        let result = use_case(&gateway, margin_profile())
            .handle(buy_at_100())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(gateway.call_names(), vec!["set_leverage", "place_order"]);
        assert_eq!(
            result.details.unwrap().abort_reason,
            Some(AbortReason::Order)
        );
    }

    #[tokio::test]
    async fn confirmed_entry_uses_average_price() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .push_position(Ok(Some(flat_position("BTCUSDT"))))
            .push_position(Ok(Some(open_position(
                "BTCUSDT",
                Side::Buy,
                dec!(0.01),
                dec!(200),
            ))));

        let profile = ExecutionProfile {
            entry_price_source: EntryPriceSource::Confirmed,
            ..margin_profile()
        };
        let result = use_case(&gateway, profile)
            .handle(buy_at_100())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(
            gateway.call_names(),
            vec![
                "set_leverage",
                "place_order",
                "get_position",
                "get_position",
                "set_protective_stop"
            ]
        );
        let details = result.details.unwrap();
        assert_eq!(details.entry_price, Some(dec!(200)));
        assert_eq!(details.take_profit, Some(dec!(200.43)));
    }

    #[tokio::test]
    async fn missing_entry_price_polls_position() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_position(Ok(Some(open_position(
            "BTCUSDT",
            Side::Sell,
            dec!(0.01),
            dec!(100),
        ))));

        let result = use_case(&gateway, margin_profile())
            .handle(raw("sell"))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        assert!(gateway.call_names().contains(&"get_position"));
    }

    #[tokio::test]
    async fn confirmation_timeout_flags_unprotected() {
        let gateway = Arc::new(FakeGateway::new());

        let result = use_case(&gateway, margin_profile())
            .handle(raw("buy"))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.position_unprotected());
        let details = result.details.unwrap();
        assert_eq!(details.abort_reason, Some(AbortReason::PositionTimeout));
        assert_eq!(details.stage, Some(ExecutionStage::Entered));
        assert_eq!(
            gateway.call_names(),
            vec![
                "set_leverage",
                "place_order",
                "get_position",
                "get_position",
                "get_position"
            ]
        );
    }

    #[tokio::test]
    async fn stop_failure_leaves_position_flagged() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_stop(Err(error(GatewayErrorKind::Rejected)));

        let result = use_case(&gateway, margin_profile())
            .handle(buy_at_100())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.position_unprotected());
        assert!(result.message.contains("WITHOUT protection"));
        assert_eq!(
            result.details.unwrap().abort_reason,
            Some(AbortReason::Protection)
        );
        assert_eq!(placed_orders(&gateway).len(), 1);
    }

    #[tokio::test]
    async fn stop_failure_can_close_position() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_stop(Err(error(GatewayErrorKind::Rejected)));

        let profile = ExecutionProfile {
            on_protection_failure: ProtectionFailurePolicy::ClosePosition,
            ..margin_profile()
        };
        let result = use_case(&gateway, profile)
            .handle(buy_at_100())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(!result.position_unprotected());

        let orders = placed_orders(&gateway);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].side, Side::Sell);
        assert!(orders[1].reduce_only);
        assert_eq!(orders[1].quantity, dec!(0.01));
        assert!(result.details.unwrap().compensating_close.is_some());
    }

    fn price_profile(tp_percent: Option<Decimal>, sl_percent: Option<Decimal>) -> ExecutionProfile {
        ExecutionProfile {
            protection: ProtectionSettings {
                percent_mode: PercentMode::Price,
                tp_percent,
                sl_percent,
                ..ProtectionSettings::default()
            },
            ..margin_profile()
        }
    }

    #[tokio::test]
    async fn overflowing_target_flags_unprotected() {
        let gateway = Arc::new(FakeGateway::new());
        let payload = RawSignal {
            entry_price: Some("70000000000000000000000000000".to_string()),
            tp_percent: Some("50".to_string()),
            ..buy_at_100()
        };

        let result = use_case(&gateway, price_profile(None, None))
            .handle(payload)
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.position_unprotected());
        assert_eq!(
            result.details.unwrap().abort_reason,
            Some(AbortReason::Protection)
        );
        assert_eq!(gateway.call_names(), vec!["set_leverage", "place_order"]);
    }

    #[tokio::test]
    async fn overflowing_target_can_close_position() {
        let gateway = Arc::new(FakeGateway::new());
        let payload = RawSignal {
            entry_price: Some("70000000000000000000000000000".to_string()),
            tp_percent: Some("50".to_string()),
            ..buy_at_100()
        };
        let profile = ExecutionProfile {
            on_protection_failure: ProtectionFailurePolicy::ClosePosition,
            ..price_profile(None, None)
        };

        let result = use_case(&gateway, profile).handle(payload).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(!result.position_unprotected());
        let orders = placed_orders(&gateway);
        assert_eq!(orders.len(), 2);
        assert!(orders[1].reduce_only);
    }

    #[tokio::test]
    async fn stop_below_zero_is_never_sent() {
        let gateway = Arc::new(FakeGateway::new());
        let payload = RawSignal {
            sl_percent: Some("150".to_string()),
            ..buy_at_100()
        };

        let result = use_case(&gateway, price_profile(Some(dec!(5)), None))
            .handle(payload)
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.position_unprotected());
        assert_eq!(gateway.call_names(), vec!["set_leverage", "place_order"]);
    }

    #[tokio::test]
    async fn no_protection_source_succeeds_unprotected() {
        let gateway = Arc::new(FakeGateway::new());
        let profile = ExecutionProfile {
            protection: ProtectionSettings::default(),
            ..margin_profile()
        };

        let result = use_case(&gateway, profile)
            .handle(buy_at_100())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        assert!(result.position_unprotected());
        assert_eq!(gateway.call_names(), vec!["set_leverage", "place_order"]);
    }

    #[tokio::test]
    async fn signal_prices_override_config() {
        let gateway = Arc::new(FakeGateway::new());
        let payload = RawSignal {
            take_profit: Some("130".to_string()),
            stop_loss: Some("90".to_string()),
            ..buy_at_100()
        };

        use_case(&gateway, margin_profile())
            .handle(payload)
            .await
            .unwrap();

        let calls = gateway.calls();
        let Some(GatewayCall::SetProtectiveStop(order)) = calls.last() else {
            panic!("expected protection call");
        };
        assert_eq!(order.take_profit, Some(PriceLeg::market(dec!(130))));
        assert_eq!(order.stop_loss, Some(PriceLeg::market(dec!(90))));
    }

    #[tokio::test]
    async fn signal_quantity_required_in_signal_mode() {
        let gateway = Arc::new(FakeGateway::new());
        let profile = ExecutionProfile {
            quantity_source: QuantitySource::Signal,
            ..margin_profile()
        };

        let err = use_case(&gateway, profile)
            .handle(buy_at_100())
            .await
            .unwrap_err();
        assert!(matches!(err, SignalRejection::InvalidPayload { .. }));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn close_long_sends_reduce_only_sell() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_position(Ok(Some(open_position(
            "BTCUSDT",
            Side::Buy,
            dec!(3),
            dec!(100),
        ))));

        let result = use_case(&gateway, margin_profile())
            .handle(raw("close_long"))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(gateway.call_names(), vec!["get_position", "place_order"]);
        let orders = placed_orders(&gateway);
        assert_eq!(orders[0].side, Side::Sell);
        assert_eq!(orders[0].quantity, dec!(3));
        assert!(orders[0].reduce_only);
    }

    #[tokio::test]
    async fn close_quantity_capped_at_position_size() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_position(Ok(Some(open_position(
            "BTCUSDT",
            Side::Sell,
            dec!(1),
            dec!(100),
        ))));
        let payload = RawSignal {
            quantity: Some("5".to_string()),
            ..raw("close")
        };

        use_case(&gateway, margin_profile())
            .handle(payload)
            .await
            .unwrap();

        let orders = placed_orders(&gateway);
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[0].quantity, dec!(1));
    }

    #[tokio::test]
    async fn close_without_position_is_ignored() {
        let gateway = Arc::new(FakeGateway::new());

        let result = use_case(&gateway, margin_profile())
            .handle(raw("close"))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Ignored);
        assert_eq!(gateway.call_names(), vec!["get_position"]);
    }

    #[tokio::test]
    async fn close_short_ignores_long_position() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_position(Ok(Some(open_position(
            "BTCUSDT",
            Side::Buy,
            dec!(1),
            dec!(100),
        ))));

        let result = use_case(&gateway, margin_profile())
            .handle(raw("close_short"))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Ignored);
        assert!(placed_orders(&gateway).is_empty());
    }

    #[tokio::test]
    async fn concurrent_signals_for_one_instrument_do_not_interleave() {
        let gateway = Arc::new(FakeGateway::new());
        let use_case = Arc::new(use_case(&gateway, margin_profile()));

        let a = {
            let use_case = Arc::clone(&use_case);
            tokio::spawn(async move { use_case.handle(buy_at_100()).await })
        };
        let b = {
            let use_case = Arc::clone(&use_case);
            tokio::spawn(async move { use_case.handle(buy_at_100()).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let names = gateway.call_names();
        assert_eq!(names.len(), 6);
        assert_eq!(names[..3], names[3..]);
        assert_eq!(names[0], "set_leverage");
    }
}
