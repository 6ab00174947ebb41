//! Bourse Strategies - swappable trading policies
//!
//! Every strategy implements `bourse_core::engine::Strategy`. The venue clones
//! one value per trader thread, so a strategy may keep private state in
//! `&mut self` without any synchronisation.
//!
//! ## Available Strategies
//!
//! ### [`BuyOneIfAffordable`] (default)
//!
//! Offers to buy one unit of every quote and lets the ledger refuse what the
//! account cannot pay for. Never sells.
//!
//! ### [`PriceLimitBuyer`]
//!
//! Buys a fixed quantity whenever the price is at or below a limit.
//!
//! ### [`TakeProfit`]
//!
//! Buys one unit at or below a floor and sells one unit at or above a ceiling.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use bourse_core::prelude::*;
//! use bourse_strategies::BuyOneIfAffordable;
//!
//! let venue = Venue::new(VenueConfig::default(), VenueMetrics::new()?)?;
//! let report = venue.run(source, BuyOneIfAffordable)?;
//! ```
//!
//! The ledger re-checks funds and holdings under its own lock, so a strategy
//! acting on a stale snapshot can only produce a rejected order, never an
//! overdraft.

pub mod buy_one;
pub mod price_limit;
pub mod take_profit;

#[cfg(test)]
mod test_helpers;

pub use buy_one::BuyOneIfAffordable;
pub use price_limit::PriceLimitBuyer;
pub use take_profit::TakeProfit;

use thiserror::Error;

/// Rejected strategy parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("quantity must be positive")]
    ZeroQuantity,

    #[error("price {0} must be positive")]
    NonPositivePrice(rust_decimal::Decimal),

    #[error("buy threshold {buy_below} must be below sell threshold {sell_above}")]
    InvertedThresholds {
        buy_below: rust_decimal::Decimal,
        sell_above: rust_decimal::Decimal,
    },
}
