//! Signal actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Side;

/// What an inbound signal asks the relay to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    /// Open (or add to) a long position.
    OpenLong,
    /// Open (or add to) a short position.
    OpenShort,
    /// Reduce a long position.
    CloseLong,
    /// Reduce a short position.
    CloseShort,
    /// Close whatever position is open.
    Close,
}

impl SignalAction {
    /// Parse an action string, accepting the aliases charting alerts use.
    ///
    /// Matching is case-insensitive. Returns `None` for unsupported actions.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" | "open_long" => Some(Self::OpenLong),
            "sell" | "short" | "open_short" => Some(Self::OpenShort),
            "close_long" => Some(Self::CloseLong),
            "close_short" => Some(Self::CloseShort),
            "close" => Some(Self::Close),
            _ => None,
        }
    }

    /// Side of the entry order for opening actions.
    #[must_use]
    pub const fn entry_side(&self) -> Option<Side> {
        match self {
            Self::OpenLong => Some(Side::Buy),
            Self::OpenShort => Some(Side::Sell),
            Self::CloseLong | Self::CloseShort | Self::Close => None,
        }
    }

    /// Direction of the position a closing action targets.
    ///
    /// `Close` targets whichever side is open, so it returns `None`.
    #[must_use]
    pub const fn closes_side(&self) -> Option<Side> {
        match self {
            Self::CloseLong => Some(Side::Buy),
            Self::CloseShort => Some(Side::Sell),
            Self::OpenLong | Self::OpenShort | Self::Close => None,
        }
    }

    /// Whether this action opens exposure.
    #[must_use]
    pub const fn is_entry(&self) -> bool {
        matches!(self, Self::OpenLong | Self::OpenShort)
    }

    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenLong => "open_long",
            Self::OpenShort => "open_short",
            Self::CloseLong => "close_long",
            Self::CloseShort => "close_short",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
