//! Leverage Configurator
//!
//! Applies the desired leverage. The venue refusing because leverage is
//! already at that value counts as success; every other failure aborts.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;

use super::record_call;
use crate::application::errors::LeverageError;
use crate::application::ports::{ExchangeGateway, GatewayErrorKind, LeverageRequest};
use crate::domain::shared::Instrument;

/// How the leverage step succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeverageAck {
    /// Venue applied the new leverage.
    Applied,
    /// Leverage was already at the requested value.
    AlreadySet,
}

/// Ensures an instrument's leverage matches the desired value.
pub struct LeverageConfigurator<G: ExchangeGateway> {
    gateway: Arc<G>,
}

impl<G: ExchangeGateway> LeverageConfigurator<G> {
    /// Create a new configurator.
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Set leverage on both sides of `instrument`.
    ///
    /// # Errors
    ///
    /// Returns [`LeverageError`] for any gateway failure other than
    /// [`GatewayErrorKind::LeverageNotModified`].
    pub async fn ensure_leverage(
        &self,
        instrument: &Instrument,
        leverage: Decimal,
    ) -> Result<LeverageAck, LeverageError> {
        let request = LeverageRequest::symmetric(instrument.clone(), leverage);
        let started = Instant::now();
        let result = self.gateway.set_leverage(&request).await;
        record_call("set_leverage", started, &result);

        match result {
            Ok(()) => {
                tracing::info!(%instrument, %leverage, "Leverage applied");
                Ok(LeverageAck::Applied)
            }
            Err(e) if e.kind == GatewayErrorKind::LeverageNotModified => {
                tracing::warn!(
                    %instrument,
                    %leverage,
                    code = ?e.code,
                    "Leverage already set, continuing"
                );
                Ok(LeverageAck::AlreadySet)
            }
            Err(e) => {
                tracing::error!(
                    %instrument,
                    %leverage,
                    kind = %e.kind,
                    code = ?e.code,
                    error = %e.message,
                    "Leverage configuration failed"
                );
                Err(LeverageError(e))
            }
        }
    }
}
