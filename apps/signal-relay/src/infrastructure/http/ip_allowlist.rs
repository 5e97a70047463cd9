//! Source-IP allowlist middleware.

use std::collections::HashSet;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::response::ErrorResponse;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Set of peer addresses allowed to send signals.
///
/// An empty set disables the check.
#[derive(Debug, Clone, Default)]
pub struct IpAllowlist {
    allowed: HashSet<IpAddr>,
    trust_forwarded_for: bool,
}

impl IpAllowlist {
    /// Parse a list of addresses.
    pub fn new<I, S>(addresses: I, trust_forwarded_for: bool) -> Result<Self, AddrParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = addresses
            .into_iter()
            .map(|addr| addr.as_ref().trim().parse::<IpAddr>().map(|ip| ip.to_canonical()))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            allowed,
            trust_forwarded_for,
        })
    }

    /// Allowlist that admits everyone.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether the check is active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.allowed.is_empty()
    }

    /// Whether `ip` may call.
    #[must_use]
    pub fn allows(&self, ip: IpAddr) -> bool {
        !self.is_enabled() || self.allowed.contains(&ip.to_canonical())
    }

    /// Caller address: the first forwarded hop when trusted, else the peer.
    #[must_use]
    pub fn client_ip(&self, request: &Request) -> Option<IpAddr> {
        if self.trust_forwarded_for {
            let forwarded = request
                .headers()
                .get(FORWARDED_FOR)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .and_then(|hop| hop.trim().parse::<IpAddr>().ok());
            if forwarded.is_some() {
                return forwarded;
            }
        }
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    }
}

/// Reject callers outside the allowlist with 403.
pub async fn enforce_allowlist(
    State(allowlist): State<Arc<IpAllowlist>>,
    request: Request,
    next: Next,
) -> Response {
    if !allowlist.is_enabled() {
        return next.run(request).await;
    }

    match allowlist.client_ip(&request) {
        Some(ip) if allowlist.allows(ip) => next.run(request).await,
        client => {
            tracing::warn!(
                client_ip = ?client,
                path = %request.uri().path(),
                "Request from address outside allowlist rejected"
            );
            (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("Access denied")),
            )
                .into_response()
        }
    }
}
