//! Instrument value object and identifier normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Suffixes charting platforms append to perpetual contract tickers.
pub const DEFAULT_INSTRUMENT_SUFFIXES: [&str; 2] = [".P", ".PERP"];

/// Maximum accepted instrument identifier length.
const MAX_INSTRUMENT_LEN: usize = 32;

/// A venue instrument identifier (e.g. "BTCUSDT").
///
/// Always stored upper-case. Construct from raw signal input through
/// [`InstrumentNormalizer::parse`] so venue suffixes are stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    /// Create a new Instrument.
    ///
    /// The identifier is normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().to_ascii_uppercase())
    }

    /// Get the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the identifier for order submission.
    ///
    /// # Errors
    ///
    /// Returns error if the identifier is empty, too long, or contains
    /// characters the venue does not use in contract names.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::invalid_value("symbol", "Symbol cannot be empty"));
        }

        if self.0.len() > MAX_INSTRUMENT_LEN {
            return Err(DomainError::invalid_value(
                "symbol",
                "Symbol exceeds maximum length",
            ));
        }

        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::invalid_value(
                "symbol",
                "Symbol contains invalid characters",
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Instrument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strips charting-platform decorations from raw tickers.
///
/// `BYBIT:BTCUSDT.P` becomes `BTCUSDT`. Suffixes are removed by exact match,
/// repeatedly, so `normalize(normalize(x)) == normalize(x)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentNormalizer {
    suffixes: Vec<String>,
}

impl InstrumentNormalizer {
    /// Create a normalizer for the given suffix list.
    ///
    /// Empty suffixes are ignored.
    #[must_use]
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { suffixes }
    }

    /// Configured suffixes (upper-case).
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Normalize a raw identifier into its venue form.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let upper = raw.to_ascii_uppercase();
        let mut value = upper.rsplit_once(':').map_or(upper.as_str(), |(_, rest)| rest);

        loop {
            value = value.trim();
            let stripped = self
                .suffixes
                .iter()
                .find(|suffix| value.len() > suffix.len() && value.ends_with(suffix.as_str()));

            match stripped {
                Some(suffix) => value = &value[..value.len() - suffix.len()],
                None => break,
            }
        }

        value.to_string()
    }

    /// Normalize and validate a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns error if the normalized identifier is not a valid instrument.
    pub fn parse(&self, raw: &str) -> Result<Instrument, DomainError> {
        let instrument = Instrument(self.normalize(raw));
        instrument.validate()?;
        Ok(instrument)
    }
}

impl Default for InstrumentNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUMENT_SUFFIXES)
    }
}
