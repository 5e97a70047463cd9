//! Protection Bounded Context
//!
//! Take-profit / stop-loss derivation for freshly entered positions: trigger
//! prices from entry, percentage targets and leverage, optional limit prices,
//! and the [`ProtectionOrder`] handed to the venue.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::ProtectionError;
pub use services::{
    ProtectionCalculator, ProtectionSettings, ProtectionTargets, derive_stops, limit_price,
};
pub use value_objects::{
    PercentMode, PriceLeg, ProtectionOrder, StopPrices, TpSlMode, TriggerReference,
};
