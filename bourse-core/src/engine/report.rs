//! Termination report
//!
//! Built once, after every pipeline thread has been joined. The `Display`
//! rendering is the operator-facing summary; the serde form backs
//! `--report-json`.

use super::ingest::IngestStats;
use super::shutdown::ShutdownReason;
use super::worker::WorkerReport;
use crate::core::Transaction;
use crate::ledger::{LedgerSnapshot, LogOrder};
use crate::queue::QueueStats;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct VenueReport {
    /// `None` only if the venue was joined without any trigger firing
    pub reason: Option<ShutdownReason>,
    pub initial_balance: Decimal,
    #[serde(rename = "final")]
    pub final_state: LedgerSnapshot,
    pub log_order: LogOrder,
    pub transactions: Vec<Transaction>,
    pub ingest: IngestStats,
    pub workers: Vec<WorkerReport>,
    /// Worker ids whose thread panicked
    pub failed_workers: Vec<usize>,
    pub queue: QueueStats,
    /// Error from `Ledger::reconcile`, if the books did not balance
    pub audit: Option<String>,
}

impl VenueReport {
    pub fn bought(&self) -> usize {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == crate::core::Side::Buy)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_workers.is_empty() && self.audit.is_none()
    }
}

impl fmt::Display for VenueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Venue report ===")?;
        match self.reason {
            Some(reason) => writeln!(f, "Shutdown:     {}", reason)?,
            None => writeln!(f, "Shutdown:     -")?,
        }
        writeln!(f, "Balance:      {:.2}", self.final_state.balance)?;
        writeln!(f, "Holdings:     {}", self.final_state.holdings)?;
        writeln!(
            f,
            "Quotes:       {} read, {} queued, {} dropped, {} malformed",
            self.ingest.records, self.ingest.enqueued, self.ingest.dropped, self.ingest.malformed
        )?;

        for worker in &self.workers {
            writeln!(
                f,
                "Trader {:>3}:   {} quotes, {} bought, {} sold, {} rejected",
                worker.id, worker.quotes, worker.bought, worker.sold, worker.rejected
            )?;
        }
        for id in &self.failed_workers {
            writeln!(f, "Trader {:>3}:   PANICKED", id)?;
        }

        if self.final_state.audit_gaps > 0 {
            writeln!(
                f,
                "Audit gaps:   {} transactions not recorded",
                self.final_state.audit_gaps
            )?;
        }
        if let Some(audit) = &self.audit {
            writeln!(f, "Audit:        {}", audit)?;
        }

        writeln!(f, "Transactions:")?;
        if self.transactions.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for tx in &self.transactions {
            writeln!(f, "  {}", tx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Side, Symbol};
    use rust_decimal_macros::dec;

    fn report() -> VenueReport {
        VenueReport {
            reason: Some(ShutdownReason::EndOfInput),
            initial_balance: dec!(100.00),
            final_state: LedgerSnapshot {
                balance: dec!(40.00),
                holdings: 1,
                trades: 1,
                audit_gaps: 0,
            },
            log_order: LogOrder::NewestFirst,
            transactions: vec![Transaction {
                kind: Side::Buy,
                symbol: Symbol::new("AMZN").unwrap(),
                quantity: 1,
                price: dec!(60.00),
            }],
            ingest: IngestStats {
                records: 2,
                enqueued: 2,
                ..IngestStats::default()
            },
            workers: vec![WorkerReport {
                id: 0,
                quotes: 2,
                bought: 1,
                rejected: 1,
                ..WorkerReport::default()
            }],
            failed_workers: Vec::new(),
            queue: QueueStats::default(),
            audit: None,
        }
    }

    #[test]
    fn test_display_lists_transactions() {
        let text = report().to_string();
        assert!(text.contains("Balance:      40.00"));
        assert!(text.contains("Holdings:     1"));
        assert!(text.contains("[BUY] AMZN | qty 1 | 60.00"));
        assert!(text.contains("end of input"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["reason"], "end_of_input");
        assert_eq!(json["final"]["holdings"], 1);
        assert_eq!(json["transactions"][0]["kind"], "BUY");
        assert_eq!(json["workers"][0]["bought"], 1);
    }

    #[test]
    fn test_clean_flag() {
        let mut report = report();
        assert!(report.is_clean());
        assert_eq!(report.bought(), 1);

        report.failed_workers.push(2);
        assert!(!report.is_clean());
        assert!(report.to_string().contains("PANICKED"));
    }
}
