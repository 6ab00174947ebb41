//! Venue orchestrator
//!
//! Wires the pipeline together and owns its lifecycle:
//!
//! ```text
//!   QuoteSource ──stream──▶ IngestLoop ──try_enqueue──▶ BoundedQueue
//!                            (1 thread)                     │ dequeue
//!                                                           ▼
//!                                            TraderWorker × N ──execute──▶ Ledger
//! ```
//!
//! `start` brings everything up in dependency order and fails fast if the
//! source cannot be opened. `RunningVenue::join` is the single place where
//! threads are joined and shared state is torn down; the report is built only
//! after every thread has exited.

use super::ingest::{IngestLoop, IngestStats};
use super::report::VenueReport;
use super::shutdown::{ShutdownCoordinator, ShutdownReason};
use super::traits::Strategy;
use super::worker::{ThinkTime, TraderWorker, WorkerReport};
use crate::config::VenueConfig;
use crate::core::{Quote, StopToken, VenueError};
use crate::ledger::{Ledger, LogOrder};
use crate::monitoring::VenueMetrics;
use crate::queue::BoundedQueue;
use crate::resilience::panic_message;
use crate::source::QuoteSource;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

pub struct Venue {
    config: VenueConfig,
    metrics: VenueMetrics,
}

impl Venue {
    pub fn new(config: VenueConfig, metrics: VenueMetrics) -> Result<Self, VenueError> {
        config.validate()?;
        Ok(Self { config, metrics })
    }

    pub fn config(&self) -> &VenueConfig {
        &self.config
    }

    pub fn metrics(&self) -> &VenueMetrics {
        &self.metrics
    }

    /// Start the source, the trader pool, and the ingest thread
    ///
    /// No worker is spawned if the source fails to start. If a thread cannot
    /// be spawned, the pipeline built so far is shut down and joined before the
    /// error is returned.
    pub fn start<S>(
        &self,
        source: Arc<dyn QuoteSource>,
        strategy: S,
    ) -> Result<RunningVenue, VenueError>
    where
        S: Strategy + Clone + 'static,
    {
        let ledger = Arc::new(Ledger::new(self.config.initial_balance));
        let queue = Arc::new(BoundedQueue::new(self.config.queue_capacity));
        let stop = StopToken::new();

        info!(
            source = source.name(),
            strategy = strategy.name(),
            workers = self.config.workers,
            capacity = self.config.queue_capacity,
            balance = %self.config.initial_balance,
            "Starting venue"
        );

        let mut stream = source.start()?;

        let coordinator =
            ShutdownCoordinator::new(stop.clone(), Arc::clone(&source), Arc::clone(&queue));

        let (min, max) = self.config.think_time();
        let think_time = ThinkTime::new(min, max);

        let mut workers = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let worker = TraderWorker::new(
                id,
                Arc::clone(&queue),
                Arc::clone(&ledger),
                stop.clone(),
                strategy.clone(),
                think_time,
                self.metrics.clone(),
            );

            let spawned = thread::Builder::new()
                .name(format!("trader-{}", id))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => workers.push((id, handle)),
                Err(e) => {
                    error!(worker = id, "Failed to spawn trader thread: {}", e);
                    abort(&coordinator, workers, source.as_ref());
                    return Err(VenueError::Spawn {
                        role: format!("trader-{}", id),
                        source: e,
                    });
                }
            }
        }

        let ingest = IngestLoop::new(Arc::clone(&queue), coordinator.clone(), self.metrics.clone());
        let spawned = thread::Builder::new()
            .name("ingest".to_string())
            .spawn(move || ingest.run(&mut stream));

        let ingest = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to spawn ingest thread: {}", e);
                abort(&coordinator, workers, source.as_ref());
                return Err(VenueError::Spawn {
                    role: "ingest".to_string(),
                    source: e,
                });
            }
        };

        Ok(RunningVenue {
            log_order: self.config.log_order,
            ledger,
            queue,
            source,
            coordinator,
            ingest,
            workers,
            metrics: self.metrics.clone(),
        })
    }

    /// Start and block until the venue shuts down
    pub fn run<S>(&self, source: Arc<dyn QuoteSource>, strategy: S) -> Result<VenueReport, VenueError>
    where
        S: Strategy + Clone + 'static,
    {
        Ok(self.start(source, strategy)?.join())
    }
}

/// Tear down a partially started pipeline
fn abort(
    coordinator: &ShutdownCoordinator,
    workers: Vec<(usize, JoinHandle<WorkerReport>)>,
    source: &dyn QuoteSource,
) {
    coordinator.trigger(ShutdownReason::Fault);
    for (id, handle) in workers {
        if handle.join().is_err() {
            error!(worker = id, "Trader panicked during aborted start");
        }
    }
    if let Err(e) = source.wait() {
        warn!("Quote source did not exit cleanly: {}", e);
    }
}

/// A venue whose threads are running
pub struct RunningVenue {
    log_order: LogOrder,
    ledger: Arc<Ledger>,
    queue: Arc<BoundedQueue<Quote>>,
    source: Arc<dyn QuoteSource>,
    coordinator: ShutdownCoordinator,
    ingest: JoinHandle<IngestStats>,
    workers: Vec<(usize, JoinHandle<WorkerReport>)>,
    metrics: VenueMetrics,
}

impl RunningVenue {
    /// Handle for signal handlers and embedding code
    pub fn coordinator(&self) -> ShutdownCoordinator {
        self.coordinator.clone()
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn shutdown(&self) -> bool {
        self.coordinator.trigger(ShutdownReason::Requested)
    }

    /// Wait for every thread, reap the source, and build the report
    pub fn join(self) -> VenueReport {
        let ingest = match self.ingest.join() {
            Ok(stats) => stats,
            Err(payload) => {
                error!(message = %panic_message(payload.as_ref()), "Ingest thread panicked");
                self.coordinator.trigger(ShutdownReason::Fault);
                IngestStats::default()
            }
        };

        let mut workers = Vec::with_capacity(self.workers.len());
        let mut failed_workers = Vec::new();
        for (id, handle) in self.workers {
            match handle.join() {
                Ok(report) => workers.push(report),
                Err(payload) => {
                    error!(
                        worker = id,
                        message = %panic_message(payload.as_ref()),
                        "Trader thread panicked"
                    );
                    failed_workers.push(id);
                }
            }
        }

        if let Err(e) = self.source.wait() {
            warn!(source = self.source.name(), "Quote source did not exit cleanly: {}", e);
        }

        let final_state = self.ledger.snapshot();
        self.metrics.observe_ledger(&final_state);
        self.metrics.set_queue_depth(self.queue.len());

        let audit = match self.ledger.reconcile() {
            Ok(()) => None,
            Err(e) => {
                warn!("Ledger audit failed: {}", e);
                Some(e.to_string())
            }
        };

        let report = VenueReport {
            reason: self.coordinator.reason(),
            initial_balance: self.ledger.initial_balance(),
            final_state,
            log_order: self.log_order,
            transactions: self.ledger.transactions(self.log_order),
            ingest,
            workers,
            failed_workers,
            queue: self.queue.stats(),
            audit,
        };

        info!(
            reason = ?report.reason,
            balance = %report.final_state.balance,
            holdings = report.final_state.holdings,
            trades = report.final_state.trades,
            "Venue stopped"
        );
        report
    }
}
