//! Quote sources (the producer side of the boundary)
//!
//! A source hands the venue a byte stream of terminated records (see
//! `codec`). Where the bytes come from is the source's business: a thread in
//! this process, a child process writing to a pipe, or a canned buffer.
//!
//! Lifecycle:
//! 1. `start()` once, before any worker exists. Failure is fatal for the venue.
//! 2. `stop()` from any thread, any number of times. It must make the stream
//!    reach end-of-stream (a zero-byte read) so the ingest loop unblocks.
//! 3. `wait()` once after the ingest loop has been joined, to reap the producer.

pub mod generator;
pub mod process;
pub mod scripted;
pub mod synthetic;

pub use generator::QuoteGenerator;
pub use process::ProcessSource;
pub use scripted::ScriptedSource;
pub use synthetic::SyntheticSource;

use crate::core::SourceError;
use std::io::Read;

/// Boundary endpoint read by the ingest loop
pub type QuoteStream = Box<dyn Read + Send>;

pub trait QuoteSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Launch the producer and return the read end of the boundary
    fn start(&self) -> Result<QuoteStream, SourceError>;

    /// Ask the producer to stop; idempotent
    fn stop(&self);

    /// Reap the producer after the stream has been drained
    fn wait(&self) -> Result<(), SourceError>;
}
