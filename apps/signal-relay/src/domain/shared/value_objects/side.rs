//! Trade direction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side, doubling as position direction (`Buy` = long, `Sell` = short).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy order / long position.
    Buy,
    /// Sell order / short position.
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Whether this side opens or holds a long position.
    #[must_use]
    pub const fn is_long(&self) -> bool {
        matches!(self, Self::Buy)
    }

    /// Position direction label.
    #[must_use]
    pub const fn direction(&self) -> &'static str {
        match self {
            Self::Buy => "long",
            Self::Sell => "short",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn side_direction() {
        assert!(Side::Buy.is_long());
        assert!(!Side::Sell.is_long());
        assert_eq!(Side::Sell.direction(), "short");
    }

    #[test]
    fn side_serde_matches_venue_casing() {
        let json = serde_json::to_string(&Side::Buy).unwrap();
        assert_eq!(json, "\"Buy\"");

        let parsed: Side = serde_json::from_str("\"Sell\"").unwrap();
        assert_eq!(parsed, Side::Sell);
    }
}
