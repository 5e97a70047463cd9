//! Protection Mode Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a percentage target is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentMode {
    /// Percentage of the entry price.
    #[default]
    Price,
    /// Percentage of posted margin: the price distance is divided by leverage.
    Margin,
}

/// Price series the venue watches to fire a stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerReference {
    /// Last traded price.
    #[default]
    LastPrice,
    /// Mark price.
    MarkPrice,
    /// Index price.
    IndexPrice,
}

impl TriggerReference {
    /// Venue wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LastPrice => "LastPrice",
            Self::MarkPrice => "MarkPrice",
            Self::IndexPrice => "IndexPrice",
        }
    }
}

impl fmt::Display for TriggerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether protection covers the whole position or an explicit size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TpSlMode {
    /// Whole position, market execution on trigger.
    #[default]
    Full,
    /// Explicit size, market or limit execution.
    Partial,
}

impl TpSlMode {
    /// Venue wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Partial => "Partial",
        }
    }
}

impl fmt::Display for TpSlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(PercentMode::default(), PercentMode::Price);
        assert_eq!(TriggerReference::default(), TriggerReference::LastPrice);
        assert_eq!(TpSlMode::default(), TpSlMode::Full);
    }

    #[test]
    fn serde_wire_values() {
        let mode: PercentMode = serde_json::from_str("\"margin\"").unwrap();
        assert_eq!(mode, PercentMode::Margin);

        let trigger: TriggerReference = serde_json::from_str("\"MarkPrice\"").unwrap();
        assert_eq!(trigger.as_str(), "MarkPrice");

        assert_eq!(serde_json::to_string(&TpSlMode::Partial).unwrap(), "\"Partial\"");
    }
}
