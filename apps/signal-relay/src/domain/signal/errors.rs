//! Signal rejection errors.

use thiserror::Error;

/// Why an inbound signal was refused before any venue call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalRejection {
    /// Shared secret missing or wrong.
    #[error("Unauthorized: invalid shared secret")]
    Unauthorized,

    /// A field is missing or does not parse.
    #[error("Invalid payload: {field}: {reason}")]
    InvalidPayload {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl SignalRejection {
    /// Build an [`SignalRejection::InvalidPayload`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable label for metrics.
    #[must_use]
    pub const fn reason_label(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidPayload { .. } => "invalid_payload",
        }
    }
}
