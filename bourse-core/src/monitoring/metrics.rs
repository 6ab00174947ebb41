//! Prometheus metrics for the venue
//!
//! Covers the pipeline end to end:
//! - Ingest (records read, quotes enqueued, quotes dropped, malformed records)
//! - Trading (fills by side, rejections by reason)
//! - State (queue depth, balance, holdings)
//!
//! Each venue owns its own `Registry`, so several venues (tests) can coexist
//! in one process.

use crate::ledger::{LedgerSnapshot, TradeOutcome};
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

const NAMESPACE: &str = "bourse";

struct Inner {
    registry: Registry,
    records_total: IntCounter,
    enqueued_total: IntCounter,
    dropped_total: IntCounter,
    malformed_total: IntCounter,
    trades_total: IntCounterVec,
    rejections_total: IntCounterVec,
    queue_depth: IntGauge,
    balance: Gauge,
    holdings: IntGauge,
}

#[derive(Clone)]
pub struct VenueMetrics {
    inner: Arc<Inner>,
}

impl VenueMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let records_total = IntCounter::with_opts(
            Opts::new("ingest_records_total", "Quote records read from the boundary")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(records_total.clone()))?;

        let enqueued_total = IntCounter::with_opts(
            Opts::new("ingest_enqueued_total", "Quotes accepted by the bounded queue")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(enqueued_total.clone()))?;

        let dropped_total = IntCounter::with_opts(
            Opts::new("ingest_dropped_total", "Quotes dropped because the queue was full")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(dropped_total.clone()))?;

        let malformed_total = IntCounter::with_opts(
            Opts::new("ingest_malformed_total", "Boundary records that failed to parse")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(malformed_total.clone()))?;

        let trades_total = IntCounterVec::new(
            Opts::new("trades_total", "Completed trades").namespace(NAMESPACE),
            &["side"],
        )?;
        registry.register(Box::new(trades_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new("trade_rejections_total", "Trade attempts the ledger refused")
                .namespace(NAMESPACE),
            &["reason"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let queue_depth = IntGauge::with_opts(
            Opts::new("queue_depth", "Quotes waiting in the bounded queue").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let balance = Gauge::with_opts(
            Opts::new("ledger_balance", "Current wallet balance").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(balance.clone()))?;

        let holdings = IntGauge::with_opts(
            Opts::new("ledger_holdings", "Units currently held").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(holdings.clone()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                records_total,
                enqueued_total,
                dropped_total,
                malformed_total,
                trades_total,
                rejections_total,
                queue_depth,
                balance,
                holdings,
            }),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn record_read(&self) {
        self.inner.records_total.inc();
    }

    pub fn record_enqueued(&self, depth: usize) {
        self.inner.enqueued_total.inc();
        self.inner.queue_depth.set(depth as i64);
    }

    pub fn record_dropped(&self) {
        self.inner.dropped_total.inc();
    }

    pub fn record_malformed(&self) {
        self.inner.malformed_total.inc();
    }

    pub fn set_queue_depth(&self, depth: usize) {
        self.inner.queue_depth.set(depth as i64);
    }

    pub fn record_outcome(&self, outcome: &TradeOutcome) {
        match outcome {
            TradeOutcome::Bought(_) => self.inner.trades_total.with_label_values(&["buy"]).inc(),
            TradeOutcome::Sold(_) => self.inner.trades_total.with_label_values(&["sell"]).inc(),
            TradeOutcome::InsufficientFunds { .. } => self
                .inner
                .rejections_total
                .with_label_values(&["insufficient_funds"])
                .inc(),
            TradeOutcome::InsufficientHoldings { .. } => self
                .inner
                .rejections_total
                .with_label_values(&["insufficient_holdings"])
                .inc(),
            TradeOutcome::BalanceOverflow { .. } => self
                .inner
                .rejections_total
                .with_label_values(&["balance_overflow"])
                .inc(),
        }
    }

    pub fn observe_ledger(&self, snapshot: &LedgerSnapshot) {
        self.inner
            .balance
            .set(snapshot.balance.to_f64().unwrap_or(f64::NAN));
        self.inner.holdings.set(snapshot.holdings as i64);
    }

    pub fn dropped(&self) -> u64 {
        self.inner.dropped_total.get()
    }

    pub fn trades(&self, side: &str) -> u64 {
        self.inner.trades_total.with_label_values(&[side]).get()
    }

    /// Rejected trades with the given reason label
    pub fn rejections(&self, reason: &str) -> u64 {
        self.inner.rejections_total.with_label_values(&[reason]).get()
    }

    /// Prometheus text exposition of every metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.inner.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Quote, Side, Symbol, Transaction};
    use rust_decimal_macros::dec;

    #[test]
    fn test_registries_are_independent() {
        let a = VenueMetrics::new().unwrap();
        let b = VenueMetrics::new().unwrap();

        a.record_dropped();
        assert_eq!(a.dropped(), 1);
        assert_eq!(b.dropped(), 0);
    }

    #[test]
    fn test_outcomes_counted_by_label() {
        let metrics = VenueMetrics::new().unwrap();
        let quote = Quote::new(Symbol::new("AAPL").unwrap(), dec!(10)).unwrap();
        let tx = Transaction {
            kind: Side::Buy,
            symbol: quote.symbol,
            quantity: 1,
            price: quote.price,
        };

        metrics.record_outcome(&TradeOutcome::Bought(tx));
        metrics.record_outcome(&TradeOutcome::Bought(tx));
        metrics.record_outcome(&TradeOutcome::InsufficientFunds {
            required: dec!(10),
            available: dec!(5),
        });

        assert_eq!(metrics.trades("buy"), 2);
        assert_eq!(metrics.trades("sell"), 0);
        assert_eq!(metrics.rejections("insufficient_funds"), 1);
        assert_eq!(metrics.rejections("balance_overflow"), 0);

        let text = metrics.render().unwrap();
        assert!(text.contains("bourse_trades_total{side=\"buy\"} 2"));
        assert!(text.contains("bourse_trade_rejections_total{reason=\"insufficient_funds\"} 1"));
    }

    #[test]
    fn test_ledger_gauges() {
        let metrics = VenueMetrics::new().unwrap();
        metrics.observe_ledger(&LedgerSnapshot {
            balance: dec!(40.00),
            holdings: 1,
            trades: 1,
            audit_gaps: 0,
        });

        let text = metrics.render().unwrap();
        assert!(text.contains("bourse_ledger_balance 40"));
        assert!(text.contains("bourse_ledger_holdings 1"));
    }
}
