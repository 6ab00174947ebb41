//! Take-profit trader
//!
//! Buys one unit when the price dips to `buy_below` and sells one unit when it
//! climbs to `sell_above`. Holdings are fungible across symbols, matching the
//! single-position ledger.

use crate::StrategyError;
use bourse_core::engine::Strategy;
use bourse_core::ledger::{LedgerSnapshot, Order};
use bourse_core::Quote;
use rust_decimal::Decimal;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeProfit {
    buy_below: Decimal,
    sell_above: Decimal,
}

impl TakeProfit {
    pub fn new(buy_below: Decimal, sell_above: Decimal) -> Result<Self, StrategyError> {
        if buy_below <= Decimal::ZERO {
            return Err(StrategyError::NonPositivePrice(buy_below));
        }
        if buy_below >= sell_above {
            return Err(StrategyError::InvertedThresholds {
                buy_below,
                sell_above,
            });
        }
        Ok(Self {
            buy_below,
            sell_above,
        })
    }

    pub fn thresholds(&self) -> (Decimal, Decimal) {
        (self.buy_below, self.sell_above)
    }
}

impl Strategy for TakeProfit {
    fn name(&self) -> &'static str {
        "TakeProfit"
    }

    fn decide(&mut self, quote: &Quote, position: &LedgerSnapshot) -> Option<Order> {
        if quote.price <= self.buy_below && position.balance >= quote.price {
            return Some(Order::buy_one());
        }

        if quote.price >= self.sell_above && position.holdings > 0 {
            return Some(Order::sell_one());
        }

        trace!(symbol = %quote.symbol, price = %quote.price, "Inside band, holding");
        None
    }
}
