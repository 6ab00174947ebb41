//! Core value types for the venue
//!
//! - `Symbol`, `Quote`: immutable price observations
//! - `Side`, `Transaction`: trade records
//! - `StopToken`: cooperative cancellation shared by every blocking call
//! - Error types for parsing, setup, and audit

pub mod errors;
pub mod stop;
pub mod types;

pub use errors::{ConfigError, LedgerError, QuoteParseError, SourceError, VenueError};
pub use stop::StopToken;
pub use types::{Quote, Side, Symbol, Transaction, PRICE_SCALE, SYMBOL_MAX_LEN};
