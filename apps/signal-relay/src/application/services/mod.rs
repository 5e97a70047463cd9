//! Application Services
//!
//! One service per pipeline step. Each wraps a single gateway operation,
//! logs the outcome and records call metrics; sequencing and failure policy
//! belong to the use case.

mod instrument_locks;
mod leverage_configurator;
mod order_executor;
mod position_confirmer;
mod stop_attacher;

use std::time::Instant;

pub use instrument_locks::{InstrumentGuard, InstrumentLocks};
pub use leverage_configurator::{LeverageAck, LeverageConfigurator};
pub use order_executor::OrderExecutor;
pub use position_confirmer::{Backoff, PollPolicy, PositionConfirmer};
pub use stop_attacher::StopAttacher;

use crate::application::ports::GatewayError;
use crate::observability::record_gateway_call;

fn record_call<T>(operation: &str, started: Instant, result: &Result<T, GatewayError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind.as_str(),
    };
    record_gateway_call(operation, outcome, started.elapsed().as_secs_f64());
}
