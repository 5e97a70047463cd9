//! Protection Value Objects

mod modes;
mod protection_order;
mod stop_prices;

pub use modes::{PercentMode, TpSlMode, TriggerReference};
pub use protection_order::{PriceLeg, ProtectionOrder};
pub use stop_prices::StopPrices;
