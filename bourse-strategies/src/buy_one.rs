//! Offer to buy one unit of every quote
//!
//! The classic venue behaviour. Affordability is left to the ledger, whose
//! check runs under the same lock as the debit, so an unaffordable quote shows
//! up as an insufficient-funds rejection rather than a silent pass. Stateless,
//! so every trader shares the same zero-sized value.

use bourse_core::engine::Strategy;
use bourse_core::ledger::{LedgerSnapshot, Order};
use bourse_core::Quote;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuyOneIfAffordable;

impl Strategy for BuyOneIfAffordable {
    fn name(&self) -> &'static str {
        "BuyOneIfAffordable"
    }

    fn decide(&mut self, _quote: &Quote, _position: &LedgerSnapshot) -> Option<Order> {
        Some(Order::buy_one())
    }
}
