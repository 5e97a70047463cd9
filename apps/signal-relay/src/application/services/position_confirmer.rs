//! Position Confirmer
//!
//! Polls the venue until the freshly entered position shows as open on the
//! expected side. Every attempt re-reads the snapshot.
//!
//! | Poll outcome | Effect |
//! |--------------|--------|
//! | Open on expected side | Return snapshot |
//! | Flat / other side / no entry | Consume attempt, sleep, poll again |
//! | Transport or rate-limit error | Consume attempt, sleep, poll again |
//! | Malformed snapshot | Abort with `InvalidResponse` |
//! | Any other error | Abort |

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::record_call;
use crate::application::errors::ConfirmationError;
use crate::application::ports::{
    ExchangeGateway, GatewayError, GatewayErrorKind, PositionSnapshot,
};
use crate::domain::shared::{Instrument, Side};
use crate::observability::record_position_poll;

/// Delay growth between polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every poll.
    Fixed,
    /// Delay multiplied after every poll, capped.
    Exponential {
        /// Growth factor.
        multiplier: f64,
        /// Upper bound on a single delay.
        max_delay: Duration,
    },
}

/// Bounded polling policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    /// Maximum number of polls.
    pub max_attempts: u32,
    /// Delay after the first unsuccessful poll.
    pub delay: Duration,
    /// Delay growth.
    pub backoff: Backoff,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
            backoff: Backoff::Fixed,
        }
    }
}

impl PollPolicy {
    /// Fixed-delay policy.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Zero-delay policy.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }

    /// Delay to wait after unsuccessful poll number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential {
                multiplier,
                max_delay,
            } => {
                let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
                let secs = (self.delay.as_secs_f64() * multiplier.powi(exponent))
                    .min(max_delay.as_secs_f64());
                Duration::try_from_secs_f64(secs).unwrap_or(max_delay)
            }
        }
    }
}

/// Confirms a position is open after entry.
pub struct PositionConfirmer<G: ExchangeGateway> {
    gateway: Arc<G>,
}

impl<G: ExchangeGateway> PositionConfirmer<G> {
    /// Create a new confirmer.
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Read the current position once.
    ///
    /// # Errors
    ///
    /// Returns the gateway error unchanged.
    pub async fn snapshot(
        &self,
        instrument: &Instrument,
    ) -> Result<Option<PositionSnapshot>, GatewayError> {
        let started = Instant::now();
        let result = self.gateway.get_position(instrument).await;
        record_call("get_position", started, &result);
        result
    }

    /// Poll until the position is open on `expected_side`.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` when no qualifying snapshot appears within
    /// `policy.max_attempts` polls, `InvalidResponse` on a malformed snapshot
    /// and `Gateway` on any other non-transient failure.
    pub async fn await_open(
        &self,
        instrument: &Instrument,
        expected_side: Side,
        policy: &PollPolicy,
    ) -> Result<PositionSnapshot, ConfirmationError> {
        let max_attempts = policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.snapshot(instrument).await {
                Ok(Some(snapshot)) if snapshot.is_open_for(expected_side) => {
                    record_position_poll(attempt);
                    tracing::info!(
                        %instrument,
                        side = %expected_side,
                        size = %snapshot.size,
                        avg_price = ?snapshot.average_entry_price,
                        attempt,
                        "Position confirmed open"
                    );
                    return Ok(snapshot);
                }
                Ok(snapshot) => {
                    tracing::debug!(
                        %instrument,
                        side = %expected_side,
                        attempt,
                        max_attempts,
                        observed_side = ?snapshot.as_ref().and_then(|s| s.side),
                        observed_size = ?snapshot.as_ref().map(|s| s.size),
                        "Position not open yet"
                    );
                }
                Err(e) if e.kind == GatewayErrorKind::InvalidResponse => {
                    tracing::error!(
                        %instrument,
                        attempt,
                        error = %e.message,
                        "Malformed position snapshot"
                    );
                    return Err(ConfirmationError::InvalidResponse(e));
                }
                Err(e) if e.kind.is_transient() => {
                    tracing::warn!(
                        %instrument,
                        attempt,
                        max_attempts,
                        kind = %e.kind,
                        error = %e.message,
                        "Transient error while polling position"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        %instrument,
                        attempt,
                        kind = %e.kind,
                        code = ?e.code,
                        error = %e.message,
                        "Position lookup failed"
                    );
                    return Err(ConfirmationError::Gateway(e));
                }
            }

            if attempt < max_attempts {
                let delay = policy.delay_after(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        record_position_poll(max_attempts);
        tracing::error!(
            %instrument,
            side = %expected_side,
            attempts = max_attempts,
            "Position never confirmed open"
        );
        Err(ConfirmationError::Timeout {
            attempts: max_attempts,
        })
    }
}
