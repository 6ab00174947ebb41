//! Strategy seam
//!
//! A strategy turns a quote into an order (or nothing). It never touches the
//! ledger: the worker hands the order to `Ledger::execute`, which re-checks
//! funds and holdings under its own lock. The snapshot passed to `decide` is
//! advisory and may already be stale by the time the order executes.
//!
//! Each worker owns its own strategy value (cloned at spawn), so `decide`
//! takes `&mut self` without any locking.

use crate::core::Quote;
use crate::ledger::{LedgerSnapshot, Order};

pub trait Strategy: Send {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Decide what to do with a dequeued quote
    fn decide(&mut self, quote: &Quote, position: &LedgerSnapshot) -> Option<Order>;
}
