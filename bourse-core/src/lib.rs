//! Bourse Core - a miniature concurrent trading venue
//!
//! A quote producer feeds price ticks through a bounded queue to a pool of
//! trader threads that buy and sell against one shared ledger.
//!
//! ## Architecture
//! - **One ingest thread** reads the quote boundary and applies drop-new backpressure
//! - **N trader threads** park on a condition variable while the queue is empty
//! - **One ledger lock** makes every trade a single critical section
//! - **One-shot shutdown** stops the producer, wakes every parked trader, then joins
//!
//! ## Core Modules
//! - `core`: value types (`Quote`, `Transaction`), errors, `StopToken`
//! - `codec`: NUL/newline-terminated record framing
//! - `queue`: bounded circular buffer with monitor semantics
//! - `ledger`: balance, holdings, transaction log
//! - `source`: quote producers (thread, child process, scripted bytes)
//! - `engine`: ingest loop, traders, shutdown, venue orchestration
//! - `config`: serde-backed venue configuration
//! - `monitoring`: prometheus metrics
//! - `resilience`: panic hook

pub mod codec;
pub mod config;
pub mod core;
pub mod engine;
pub mod ledger;
pub mod monitoring;
pub mod queue;
pub mod resilience;
pub mod source;

pub use crate::core::{
    ConfigError, LedgerError, Quote, QuoteParseError, Side, SourceError, StopToken, Symbol,
    Transaction, VenueError,
};

pub use config::VenueConfig;
pub use engine::{
    RunningVenue, ShutdownCoordinator, ShutdownReason, Strategy, Venue, VenueReport,
};
pub use ledger::{Ledger, LedgerSnapshot, LogOrder, Order, TradeOutcome};
pub use monitoring::VenueMetrics;
pub use queue::{BoundedQueue, QueueFull, QueueStats};
pub use source::{QuoteSource, QuoteStream};

/// Prelude for strategy crates and binaries
pub mod prelude {
    pub use crate::core::{Quote, Side, StopToken, Symbol, Transaction};

    pub use crate::engine::{ShutdownReason, Strategy, Venue, VenueReport};

    pub use crate::ledger::{Ledger, LedgerSnapshot, LogOrder, Order, TradeOutcome};

    pub use crate::source::{
        ProcessSource, QuoteGenerator, QuoteSource, ScriptedSource, SyntheticSource,
    };

    pub use crate::config::VenueConfig;
    pub use crate::monitoring::VenueMetrics;
}
