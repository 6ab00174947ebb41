//! Coordinated shutdown
//!
//! Triggered by an operator interrupt, by end-of-input on the boundary, or
//! programmatically. The first trigger wins; later ones are no-ops.
//!
//! ```text
//!   trigger(reason)
//!     ├─ (a) flip StopToken (exactly once)
//!     ├─ (b) source.stop()      → boundary reaches EOF, ingest loop exits
//!     └─ (c) queue.wake_all()   → parked traders re-check and drain/exit
//!   (d) Venue::join            → join ingest + traders, reap source, report
//! ```
//!
//! The signal handler only calls `trigger`; it never touches queue or ledger
//! state directly.

use crate::core::{Quote, StopToken};
use crate::queue::BoundedQueue;
use crate::source::QuoteSource;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownReason {
    /// Operator interrupt (Ctrl-C)
    Interrupt,
    /// The boundary stream ended
    EndOfInput,
    /// Requested by the embedding program
    Requested,
    /// A pipeline thread died
    Fault,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ShutdownReason::Interrupt => "interrupt",
            ShutdownReason::EndOfInput => "end of input",
            ShutdownReason::Requested => "requested",
            ShutdownReason::Fault => "fault",
        };
        f.write_str(text)
    }
}

struct Inner {
    stop: StopToken,
    source: Arc<dyn QuoteSource>,
    queue: Arc<BoundedQueue<Quote>>,
    reason: Mutex<Option<(ShutdownReason, SystemTime)>>,
}

/// Cloneable shutdown handle shared by the venue, the ingest loop, and the signal handler
#[derive(Clone)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

impl ShutdownCoordinator {
    pub fn new(
        stop: StopToken,
        source: Arc<dyn QuoteSource>,
        queue: Arc<BoundedQueue<Quote>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                stop,
                source,
                queue,
                reason: Mutex::new(None),
            }),
        }
    }

    /// Run the shutdown sequence. Returns `false` if it had already run.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        if !self.inner.stop.cancel() {
            debug!(%reason, "Shutdown already in progress, trigger ignored");
            return false;
        }

        *self.inner.reason.lock() = Some((reason, SystemTime::now()));
        info!(%reason, "Shutdown initiated");

        self.inner.source.stop();
        self.inner.queue.wake_all();
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.stop.is_stopped()
    }

    /// Token observed by every blocking operation
    pub fn token(&self) -> StopToken {
        self.inner.stop.clone()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.inner.reason.lock().as_ref().map(|(reason, _)| *reason)
    }

    pub fn triggered_at(&self) -> Option<SystemTime> {
        self.inner.reason.lock().as_ref().map(|(_, at)| *at)
    }
}
