//! Venue engine
//!
//! - `ingest`: boundary reader feeding the bounded queue
//! - `worker`: trader threads consuming the queue
//! - `shutdown`: one-shot stop propagation
//! - `venue`: startup, join, and teardown of the whole pipeline
//! - `report`: final state handed back to the caller

pub mod ingest;
pub mod report;
pub mod shutdown;
pub mod traits;
pub mod venue;
pub mod worker;

pub use ingest::{IngestLoop, IngestStats};
pub use report::VenueReport;
pub use shutdown::{ShutdownCoordinator, ShutdownReason};
pub use traits::Strategy;
pub use venue::{RunningVenue, Venue};
pub use worker::{ThinkTime, TraderWorker, WorkerReport, WorkerState};
