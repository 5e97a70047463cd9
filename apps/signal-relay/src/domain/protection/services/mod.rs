//! Protection Domain Services

pub mod calculator;

pub use calculator::{
    ProtectionCalculator, ProtectionSettings, ProtectionTargets, derive_stops, limit_price,
    stop_loss_price, take_profit_price,
};
