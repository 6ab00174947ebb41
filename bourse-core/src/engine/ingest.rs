//! Boundary ingest loop
//!
//! Runs on its own thread. Reads the boundary stream, frames records, parses
//! quotes, and offers each one to the bounded queue. A full queue drops the
//! quote (counted, never retried); a malformed record is logged and skipped.
//! End-of-stream triggers shutdown with `EndOfInput`.

use super::shutdown::{ShutdownCoordinator, ShutdownReason};
use crate::codec::RecordDecoder;
use crate::core::{Quote, QuoteParseError};
use crate::monitoring::VenueMetrics;
use crate::queue::{BoundedQueue, QueueFull};
use serde::Serialize;
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Bytes requested per boundary read
pub const READ_CHUNK: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Records framed from the stream (well-formed or not)
    pub records: u64,
    pub enqueued: u64,
    pub dropped: u64,
    pub malformed: u64,
    pub bytes: u64,
}

pub struct IngestLoop {
    queue: Arc<BoundedQueue<Quote>>,
    shutdown: ShutdownCoordinator,
    metrics: VenueMetrics,
    decoder: RecordDecoder,
    stats: IngestStats,
}

impl IngestLoop {
    pub fn new(
        queue: Arc<BoundedQueue<Quote>>,
        shutdown: ShutdownCoordinator,
        metrics: VenueMetrics,
    ) -> Self {
        Self {
            queue,
            shutdown,
            metrics,
            decoder: RecordDecoder::new(),
            stats: IngestStats::default(),
        }
    }

    /// Pump the stream until end-of-source or shutdown
    pub fn run<R: Read + ?Sized>(mut self, stream: &mut R) -> IngestStats {
        let stop = self.shutdown.token();
        let mut chunk = [0u8; READ_CHUNK];

        info!("Ingest loop started");

        while !stop.is_stopped() {
            let n = match stream.read(&mut chunk) {
                Ok(0) => {
                    debug!("Boundary stream reached end of input");
                    break;
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("Boundary read failed, treating as end of input: {}", e);
                    break;
                }
            };

            self.stats.bytes += n as u64;
            self.decoder.feed(&chunk[..n]);

            while let Some(record) = self.decoder.next_record() {
                self.handle(record);
            }
        }

        // A trailing unterminated record only counts if the producer finished on its own
        if !stop.is_stopped() {
            if let Some(record) = self.decoder.finish() {
                self.handle(record);
            }
        }

        self.shutdown.trigger(ShutdownReason::EndOfInput);

        info!(
            records = self.stats.records,
            enqueued = self.stats.enqueued,
            dropped = self.stats.dropped,
            malformed = self.stats.malformed,
            "Ingest loop stopped"
        );
        self.stats
    }

    fn handle(&mut self, record: Result<Quote, QuoteParseError>) {
        self.stats.records += 1;
        self.metrics.record_read();

        let quote = match record {
            Ok(quote) => quote,
            Err(e) => {
                self.stats.malformed += 1;
                self.metrics.record_malformed();
                error!("Malformed quote record skipped: {}", e);
                return;
            }
        };

        match self.queue.try_enqueue(quote) {
            Ok(()) => {
                self.stats.enqueued += 1;
                self.metrics.record_enqueued(self.queue.len());
                debug!(symbol = %quote.symbol, price = %quote.price, "Quote enqueued");
            }
            Err(QueueFull(dropped)) => {
                self.stats.dropped += 1;
                self.metrics.record_dropped();
                warn!(
                    symbol = %dropped.symbol,
                    price = %dropped.price,
                    "Queue full, quote dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StopToken;
    use crate::source::{QuoteSource, ScriptedSource};
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn setup(capacity: usize) -> (IngestLoop, Arc<BoundedQueue<Quote>>, ShutdownCoordinator) {
        let queue = Arc::new(BoundedQueue::new(capacity));
        let source: Arc<dyn QuoteSource> = Arc::new(ScriptedSource::from_bytes(Vec::<u8>::new()));
        let shutdown = ShutdownCoordinator::new(StopToken::new(), source, Arc::clone(&queue));
        let metrics = VenueMetrics::new().unwrap();
        let ingest = IngestLoop::new(Arc::clone(&queue), shutdown.clone(), metrics);
        (ingest, queue, shutdown)
    }

    #[test]
    fn test_enqueues_until_end_of_input() {
        let (ingest, queue, shutdown) = setup(8);
        let mut stream = Cursor::new(b"AAPL 100.00\0GOOG 200.00\0MSFT 300.00".to_vec());

        let stats = ingest.run(&mut stream);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.enqueued, 3);
        assert_eq!(stats.dropped, 0);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_dequeue().map(|q| q.price), Some(dec!(100.00)));

        assert_eq!(shutdown.reason(), Some(ShutdownReason::EndOfInput));
    }

    #[test]
    fn test_full_queue_drops_and_continues() {
        let (ingest, queue, _shutdown) = setup(1);
        let mut stream = Cursor::new(b"AAPL 1.00\0GOOG 2.00\0MSFT 3.00\0".to_vec());

        let stats = ingest.run(&mut stream);
        assert_eq!(stats.enqueued, 1);
        assert_eq!(stats.dropped, 2);

        // The oldest quote is kept; newer ones were dropped
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_dequeue().map(|q| q.price), Some(dec!(1.00)));
        assert_eq!(queue.stats().dropped, 2);
    }

    #[test]
    fn test_malformed_records_skipped() {
        let (ingest, queue, _shutdown) = setup(4);
        let mut stream = Cursor::new(b"garbage\0AAPL 5.00\0aapl 1.00\0".to_vec());

        let stats = ingest.run(&mut stream);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.enqueued, 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_stops_without_reading_after_shutdown() {
        let (ingest, queue, shutdown) = setup(4);
        shutdown.trigger(ShutdownReason::Requested);

        let mut stream = Cursor::new(b"AAPL 5.00\0".to_vec());
        let stats = ingest.run(&mut stream);

        assert_eq!(stats.records, 0);
        assert!(queue.is_empty());
        assert_eq!(shutdown.reason(), Some(ShutdownReason::Requested));
    }
}
