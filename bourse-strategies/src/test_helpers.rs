//! Quote and position builders for strategy tests

use bourse_core::ledger::LedgerSnapshot;
use bourse_core::{Quote, Symbol};
use rust_decimal::Decimal;

pub fn quote(symbol: &str, price: Decimal) -> Quote {
    Quote::new(Symbol::new(symbol).unwrap(), price).unwrap()
}

pub fn position(balance: Decimal, holdings: u64) -> LedgerSnapshot {
    LedgerSnapshot {
        balance,
        holdings,
        trades: 0,
        audit_gaps: 0,
    }
}
