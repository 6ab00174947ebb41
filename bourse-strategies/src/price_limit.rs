//! Limit buyer: buy a fixed quantity whenever the price is at or below a limit

use crate::StrategyError;
use bourse_core::engine::Strategy;
use bourse_core::ledger::{LedgerSnapshot, Order};
use bourse_core::{Quote, Side};
use rust_decimal::Decimal;
use std::num::NonZeroU32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLimitBuyer {
    limit: Decimal,
    quantity: NonZeroU32,
}

impl PriceLimitBuyer {
    pub fn new(limit: Decimal, quantity: u32) -> Result<Self, StrategyError> {
        if limit <= Decimal::ZERO {
            return Err(StrategyError::NonPositivePrice(limit));
        }
        let quantity = NonZeroU32::new(quantity).ok_or(StrategyError::ZeroQuantity)?;
        Ok(Self { limit, quantity })
    }

    pub fn limit(&self) -> Decimal {
        self.limit
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }
}

impl Strategy for PriceLimitBuyer {
    fn name(&self) -> &'static str {
        "PriceLimitBuyer"
    }

    /// Affordability is left to the ledger; an unaffordable lot is rejected there
    fn decide(&mut self, quote: &Quote, _position: &LedgerSnapshot) -> Option<Order> {
        if quote.price > self.limit {
            return None;
        }
        Some(Order {
            side: Side::Buy,
            quantity: self.quantity,
        })
    }
}
