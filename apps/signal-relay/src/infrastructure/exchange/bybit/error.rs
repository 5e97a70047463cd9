//! Bybit-specific error types.

use thiserror::Error;

use crate::application::ports::{GatewayError, GatewayErrorKind};

/// Errors from the Bybit adapter.
#[derive(Debug, Error, Clone)]
pub enum BybitError {
    /// Request could not be sent or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    /// Venue answered with a non-zero `retCode`.
    #[error("API error: {code} - {message}")]
    Api {
        /// `retCode` from the envelope.
        code: i64,
        /// `retMsg` from the envelope.
        message: String,
    },

    /// HTTP-level error without a usable envelope.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Authentication failed.
    #[error("Authentication failed (HTTP {status})")]
    AuthenticationFailed {
        /// HTTP status code.
        status: u16,
    },

    /// Rate limited at the HTTP layer.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Error from the final attempt.
        last_error: String,
    },

    /// API key or secret missing.
    #[error("API credentials are not configured")]
    MissingCredentials,

    /// Signature could not be computed.
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// `retCode` telling the requested leverage equals the current one.
pub const LEVERAGE_NOT_MODIFIED: i64 = 110_043;

/// Map a Bybit `retCode` onto the closed gateway error set.
#[must_use]
pub const fn classify_ret_code(code: i64) -> GatewayErrorKind {
    match code {
        LEVERAGE_NOT_MODIFIED => GatewayErrorKind::LeverageNotModified,
        110_004 | 110_007 | 110_012 => GatewayErrorKind::InsufficientBalance,
        10_006 | 10_018 => GatewayErrorKind::RateLimited,
        10_003 | 10_004 | 10_005 | 10_007 => GatewayErrorKind::Authentication,
        10_001 | 110_000..=110_999 => GatewayErrorKind::Rejected,
        _ => GatewayErrorKind::Unknown,
    }
}

impl From<BybitError> for GatewayError {
    fn from(err: BybitError) -> Self {
        let message = err.to_string();
        match err {
            BybitError::Api { code, .. } => {
                Self::new(classify_ret_code(code), message).with_code(code)
            }
            BybitError::Network(_) | BybitError::MaxRetriesExceeded { .. } => {
                Self::new(GatewayErrorKind::Transport, message)
            }
            BybitError::Http { status, .. } if status >= 500 => {
                Self::new(GatewayErrorKind::Transport, message)
            }
            BybitError::Http { .. } => Self::new(GatewayErrorKind::Unknown, message),
            BybitError::AuthenticationFailed { .. } | BybitError::MissingCredentials => {
                Self::new(GatewayErrorKind::Authentication, message)
            }
            BybitError::RateLimited { .. } => Self::new(GatewayErrorKind::RateLimited, message),
            BybitError::JsonParse(_) => Self::new(GatewayErrorKind::InvalidResponse, message),
            BybitError::Signing(_) => Self::new(GatewayErrorKind::Unknown, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(110_043, GatewayErrorKind::LeverageNotModified ; "leverage not modified")]
    #[test_case(110_007, GatewayErrorKind::InsufficientBalance ; "insufficient available balance")]
    #[test_case(110_004, GatewayErrorKind::InsufficientBalance ; "insufficient wallet balance")]
    #[test_case(110_012, GatewayErrorKind::InsufficientBalance ; "insufficient ab")]
    #[test_case(10_006, GatewayErrorKind::RateLimited ; "too many visits")]
    #[test_case(10_018, GatewayErrorKind::RateLimited ; "ip rate limit")]
    #[test_case(10_003, GatewayErrorKind::Authentication ; "invalid api key")]
    #[test_case(10_004, GatewayErrorKind::Authentication ; "bad signature")]
    #[test_case(10_001, GatewayErrorKind::Rejected ; "parameter error")]
    #[test_case(110_017, GatewayErrorKind::Rejected ; "reduce only rejected")]
    #[test_case(30_000, GatewayErrorKind::Unknown ; "unlisted code")]
    fn classifies_ret_codes(code: i64, kind: GatewayErrorKind) {
        assert_eq!(classify_ret_code(code), kind);
    }

    #[test]
    fn api_error_keeps_code() {
        let err: GatewayError = BybitError::Api {
            code: 110_007,
            message: "ab not enough for new order".to_string(),
        }
        .into();
        assert_eq!(err.kind, GatewayErrorKind::InsufficientBalance);
        assert_eq!(err.code, Some(110_007));
        assert!(err.message.contains("ab not enough"));
    }

    #[test]
    fn network_is_transport() {
        let err: GatewayError = BybitError::Network("connection refused".to_string()).into();
        assert_eq!(err.kind, GatewayErrorKind::Transport);
        assert!(err.kind.is_transient());
    }

    #[test]
    fn server_error_is_transport() {
        let err: GatewayError = BybitError::Http {
            status: 502,
            body: String::new(),
        }
        .into();
        assert_eq!(err.kind, GatewayErrorKind::Transport);
    }

    #[test]
    fn http_auth_and_rate_limit() {
        let auth: GatewayError = BybitError::AuthenticationFailed { status: 401 }.into();
        assert_eq!(auth.kind, GatewayErrorKind::Authentication);

        let limited: GatewayError = BybitError::RateLimited {
            retry_after_secs: 1,
        }
        .into();
        assert_eq!(limited.kind, GatewayErrorKind::RateLimited);
    }

    #[test]
    fn undecodable_is_invalid_response() {
        let err: GatewayError = BybitError::JsonParse("expected value".to_string()).into();
        assert_eq!(err.kind, GatewayErrorKind::InvalidResponse);
    }
}
