//! Shared account ledger
//!
//! Balance, holdings, and the append-only transaction log live behind one
//! lock. A trade is a single critical section:
//!
//! ```text
//!   lock ─▶ check funds/holdings ─▶ adjust balance ─▶ adjust holdings ─▶ append log ─▶ unlock
//! ```
//!
//! No observer can see a debited balance without the matching holdings
//! change, and the log never lags the balance it explains. Which worker wins
//! a race for scarce balance is whichever takes the lock first.
//!
//! Outside a critical section:
//! `balance + Σ buys − Σ sells == initial_balance`

use crate::core::{LedgerError, Quote, Side, Transaction};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use tracing::warn;

/// Traversal order for the transaction log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOrder {
    /// Most recent trade first
    #[default]
    NewestFirst,
    /// Completion order
    Chronological,
}

/// What a strategy asks the ledger to do with a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub side: Side,
    pub quantity: NonZeroU32,
}

impl Order {
    pub fn new(side: Side, quantity: u32) -> Result<Self, LedgerError> {
        let quantity = NonZeroU32::new(quantity).ok_or(LedgerError::ZeroQuantity)?;
        Ok(Self { side, quantity })
    }

    pub fn buy_one() -> Self {
        Self {
            side: Side::Buy,
            quantity: NonZeroU32::MIN,
        }
    }

    pub fn sell_one() -> Self {
        Self {
            side: Side::Sell,
            quantity: NonZeroU32::MIN,
        }
    }
}

/// Result of a trade attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    Bought(Transaction),
    Sold(Transaction),
    /// Balance below `required`; nothing changed
    InsufficientFunds { required: Decimal, available: Decimal },
    /// Holdings below `required`; nothing changed
    InsufficientHoldings { required: u64, available: u64 },
    /// Crediting `credit` would push the balance past `Decimal::MAX`; nothing changed
    BalanceOverflow { balance: Decimal, credit: Decimal },
}

impl TradeOutcome {
    /// The recorded trade, if one happened
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            TradeOutcome::Bought(tx) | TradeOutcome::Sold(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.transaction().is_some()
    }
}

/// Consistent point-in-time view of the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub balance: Decimal,
    pub holdings: u64,
    /// Transactions stored in the log
    pub trades: usize,
    /// Trades applied whose log record could not be stored
    pub audit_gaps: u64,
}

struct LedgerState {
    balance: Decimal,
    holdings: u64,
    log: Vec<Transaction>,
    audit_gaps: u64,
}

impl LedgerState {
    /// Best-effort audit append; the balance stays the source of truth
    fn append(&mut self, tx: Transaction) {
        if self.log.try_reserve(1).is_err() {
            self.audit_gaps += 1;
            warn!(
                symbol = %tx.symbol,
                price = %tx.price,
                gaps = self.audit_gaps,
                "Transaction log allocation failed, record skipped"
            );
            return;
        }
        self.log.push(tx);
    }
}

pub struct Ledger {
    initial_balance: Decimal,
    state: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            initial_balance,
            state: Mutex::new(LedgerState {
                balance: initial_balance,
                holdings: 0,
                log: Vec::new(),
                audit_gaps: 0,
            }),
        }
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    /// Buy exactly one unit at the quoted price
    pub fn try_buy(&self, quote: &Quote) -> TradeOutcome {
        self.execute(quote, Order::buy_one())
    }

    /// Sell exactly one unit at the quoted price
    pub fn try_sell(&self, quote: &Quote) -> TradeOutcome {
        self.execute(quote, Order::sell_one())
    }

    /// Apply an order against the quote as one atomic step
    pub fn execute(&self, quote: &Quote, order: Order) -> TradeOutcome {
        let quantity = order.quantity.get();
        let units = u64::from(quantity);

        let mut state = self.state.lock();

        // An unrepresentable notional can never be afforded
        let Some(notional) = quote.price.checked_mul(Decimal::from(quantity)) else {
            return TradeOutcome::InsufficientFunds {
                required: Decimal::MAX,
                available: state.balance,
            };
        };

        match order.side {
            Side::Buy => {
                if state.balance < notional {
                    return TradeOutcome::InsufficientFunds {
                        required: notional,
                        available: state.balance,
                    };
                }
                state.balance -= notional;
                state.holdings += units;
            }
            Side::Sell => {
                if state.holdings < units {
                    return TradeOutcome::InsufficientHoldings {
                        required: units,
                        available: state.holdings,
                    };
                }
                let Some(balance) = state.balance.checked_add(notional) else {
                    return TradeOutcome::BalanceOverflow {
                        balance: state.balance,
                        credit: notional,
                    };
                };
                state.balance = balance;
                state.holdings -= units;
            }
        }

        let tx = Transaction {
            kind: order.side,
            symbol: quote.symbol,
            quantity,
            price: quote.price,
        };
        state.append(tx);

        match order.side {
            Side::Buy => TradeOutcome::Bought(tx),
            Side::Sell => TradeOutcome::Sold(tx),
        }
    }

    #[cfg(test)]
    fn record_audit_gap(&self) {
        self.state.lock().audit_gaps += 1;
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock();
        LedgerSnapshot {
            balance: state.balance,
            holdings: state.holdings,
            trades: state.log.len(),
            audit_gaps: state.audit_gaps,
        }
    }

    /// Copy of the transaction log in the requested order
    pub fn transactions(&self, order: LogOrder) -> Vec<Transaction> {
        let state = self.state.lock();
        match order {
            LogOrder::Chronological => state.log.clone(),
            LogOrder::NewestFirst => state.log.iter().rev().copied().collect(),
        }
    }

    /// Check the balance and holdings against the log
    pub fn reconcile(&self) -> Result<(), LedgerError> {
        let state = self.state.lock();

        if state.audit_gaps > 0 {
            return Err(LedgerError::AuditIncomplete {
                gaps: state.audit_gaps,
            });
        }

        let mut expected_balance = self.initial_balance;
        let mut expected_holdings: u64 = 0;
        for tx in &state.log {
            let units = u64::from(tx.quantity);
            let replayed = tx
                .price
                .checked_mul(Decimal::from(tx.quantity))
                .and_then(|notional| match tx.kind {
                    Side::Buy => expected_balance.checked_sub(notional),
                    Side::Sell => expected_balance.checked_add(notional),
                });
            let Some(balance) = replayed else {
                return Err(LedgerError::ReplayOverflow {
                    symbol: tx.symbol.to_string(),
                });
            };
            expected_balance = balance;
            expected_holdings = match tx.kind {
                Side::Buy => expected_holdings.saturating_add(units),
                Side::Sell => expected_holdings.saturating_sub(units),
            };
        }

        if expected_balance != state.balance {
            return Err(LedgerError::BalanceMismatch {
                expected: expected_balance,
                actual: state.balance,
            });
        }

        if expected_holdings != state.holdings {
            return Err(LedgerError::HoldingsMismatch {
                expected: expected_holdings,
                actual: state.holdings,
            });
        }

        Ok(())
    }
}
