//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod instrument;
mod side;

pub use instrument::{DEFAULT_INSTRUMENT_SUFFIXES, Instrument, InstrumentNormalizer};
pub use side::Side;
