//! Unvalidated signal payload.

/// Signal fields exactly as received, before authentication and parsing.
///
/// Numeric fields are kept as text so decimal values are parsed without
/// passing through binary floating point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSignal {
    /// Shared secret (`secret` or `passphrase`).
    pub secret: Option<String>,
    /// Instrument identifier, possibly prefixed or suffixed.
    pub symbol: Option<String>,
    /// Action string.
    pub action: Option<String>,
    /// Order quantity in contracts / base units.
    pub quantity: Option<String>,
    /// Desired leverage.
    pub leverage: Option<String>,
    /// Client-supplied entry price.
    pub entry_price: Option<String>,
    /// Absolute take-profit price.
    pub take_profit: Option<String>,
    /// Absolute stop-loss price.
    pub stop_loss: Option<String>,
    /// Take-profit distance in percent.
    pub tp_percent: Option<String>,
    /// Stop-loss distance in percent.
    pub sl_percent: Option<String>,
    /// Free-text note, logged only.
    pub comment: Option<String>,
}
