//! Trader worker
//!
//! ```text
//!   RUNNING ──dequeue → Some(quote)──▶ TRADING ──think time──▶ RUNNING
//!      │
//!      └──dequeue → None (stopped and drained)──▶ TERMINATED
//! ```
//!
//! Termination is cooperative. A worker only notices shutdown inside
//! `dequeue`, so an in-flight trade always finishes its ledger critical
//! section first.

use super::traits::Strategy;
use crate::core::{Quote, StopToken};
use crate::ledger::{Ledger, TradeOutcome};
use crate::monitoring::VenueMetrics;
use crate::queue::BoundedQueue;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Trading,
    Terminated,
}

/// Randomized pause after each quote, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    min: Duration,
    max: Duration,
}

impl ThinkTime {
    pub fn new(min: Duration, max: Duration) -> Self {
        // Inverted bounds collapse to `min`
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max.is_zero() {
            return Duration::ZERO;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Per-worker tallies returned at termination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub id: usize,
    pub quotes: u64,
    pub bought: u64,
    pub sold: u64,
    /// Orders the ledger refused (funds or holdings)
    pub rejected: u64,
    /// Quotes the strategy declined to trade
    pub passed: u64,
}

pub struct TraderWorker<S: Strategy> {
    id: usize,
    queue: Arc<BoundedQueue<Quote>>,
    ledger: Arc<Ledger>,
    stop: StopToken,
    strategy: S,
    think_time: ThinkTime,
    metrics: VenueMetrics,
    state: WorkerState,
    report: WorkerReport,
}

impl<S: Strategy> TraderWorker<S> {
    pub fn new(
        id: usize,
        queue: Arc<BoundedQueue<Quote>>,
        ledger: Arc<Ledger>,
        stop: StopToken,
        strategy: S,
        think_time: ThinkTime,
        metrics: VenueMetrics,
    ) -> Self {
        Self {
            id,
            queue,
            ledger,
            stop,
            strategy,
            think_time,
            metrics,
            state: WorkerState::Running,
            report: WorkerReport {
                id,
                ..WorkerReport::default()
            },
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Trade until shutdown is observed with an empty queue
    pub fn run(mut self) -> WorkerReport {
        let mut rng = rand::thread_rng();
        info!(worker = self.id, strategy = self.strategy.name(), "Trader started");

        while let Some(quote) = self.queue.dequeue(&self.stop) {
            self.transition(WorkerState::Trading);
            self.metrics.set_queue_depth(self.queue.len());
            self.trade(&quote);
            self.transition(WorkerState::Running);

            let pause = self.think_time.sample(&mut rng);
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }

        self.transition(WorkerState::Terminated);
        info!(
            worker = self.id,
            quotes = self.report.quotes,
            bought = self.report.bought,
            sold = self.report.sold,
            rejected = self.report.rejected,
            "Trader stopped"
        );
        self.report
    }

    /// Handle one quote (the TRADING state)
    pub fn trade(&mut self, quote: &Quote) -> Option<TradeOutcome> {
        self.report.quotes += 1;

        let position = self.ledger.snapshot();
        let Some(order) = self.strategy.decide(quote, &position) else {
            self.report.passed += 1;
            trace!(worker = self.id, symbol = %quote.symbol, price = %quote.price, "Strategy passed");
            return None;
        };

        let outcome = self.ledger.execute(quote, order);
        self.metrics.record_outcome(&outcome);

        match &outcome {
            TradeOutcome::Bought(tx) => {
                self.report.bought += 1;
                info!(
                    worker = self.id,
                    symbol = %tx.symbol,
                    price = %tx.price,
                    quantity = tx.quantity,
                    "BUY"
                );
            }
            TradeOutcome::Sold(tx) => {
                self.report.sold += 1;
                info!(
                    worker = self.id,
                    symbol = %tx.symbol,
                    price = %tx.price,
                    quantity = tx.quantity,
                    "SELL"
                );
            }
            TradeOutcome::InsufficientFunds { required, available } => {
                self.report.rejected += 1;
                info!(
                    worker = self.id,
                    symbol = %quote.symbol,
                    required = %required,
                    available = %available,
                    "Insufficient funds"
                );
            }
            TradeOutcome::InsufficientHoldings { required, available } => {
                self.report.rejected += 1;
                info!(
                    worker = self.id,
                    symbol = %quote.symbol,
                    required,
                    available,
                    "Insufficient holdings"
                );
            }
            TradeOutcome::BalanceOverflow { balance, credit } => {
                self.report.rejected += 1;
                warn!(
                    worker = self.id,
                    symbol = %quote.symbol,
                    balance = %balance,
                    credit = %credit,
                    "Sale would overflow the balance"
                );
            }
        }

        self.metrics.observe_ledger(&self.ledger.snapshot());
        Some(outcome)
    }

    fn transition(&mut self, next: WorkerState) {
        debug!(worker = self.id, from = ?self.state, to = ?next, "Worker state");
        self.state = next;
    }
}
