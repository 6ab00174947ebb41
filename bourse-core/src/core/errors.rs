//! Domain-specific error types for the venue
//!
//! Recoverable trading conditions (insufficient funds, a full queue) are not
//! errors; they are outcome values returned by the ledger and queue. The types
//! here cover malformed input, setup failures, and audit failures.

use rust_decimal::Decimal;
use thiserror::Error;

/// A quote record that violates the `<SYMBOL> <price>` contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteParseError {
    #[error("empty quote record")]
    EmptyRecord,

    #[error("quote record '{record}' has no price")]
    MissingPrice { record: String },

    #[error("quote record '{record}' has trailing fields")]
    TrailingInput { record: String },

    #[error("invalid symbol '{symbol}': expected 1-9 uppercase letters or digits")]
    InvalidSymbol { symbol: String },

    #[error("invalid price '{raw}'")]
    InvalidPrice { raw: String },

    #[error("price must be positive, got {price}")]
    NonPositivePrice { price: Decimal },

    #[error("quote record is not valid UTF-8")]
    NotUtf8,

    #[error("quote record exceeds {max} bytes without a terminator")]
    Overlong { max: usize },
}

/// Failures starting, stopping, or reaping a quote source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to spawn quote producer '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("quote producer has no stdout pipe")]
    MissingStdout,

    #[error("quote source already started")]
    AlreadyStarted,

    #[error("quote producer thread panicked")]
    ProducerPanicked,

    #[error("quote source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ledger audit and order validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("order quantity must be positive")]
    ZeroQuantity,

    #[error("balance {actual} does not reconcile with transaction log (expected {expected})")]
    BalanceMismatch { expected: Decimal, actual: Decimal },

    #[error("holdings {actual} do not reconcile with transaction log (expected {expected})")]
    HoldingsMismatch { expected: u64, actual: u64 },

    #[error("transaction log is incomplete ({gaps} records could not be stored)")]
    AuditIncomplete { gaps: u64 },

    #[error("replaying the {symbol} trade overflows the balance")]
    ReplayOverflow { symbol: String },
}

/// Invalid or unreadable venue configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fatal venue errors (setup failures abort before any worker starts)
#[derive(Debug, Error)]
pub enum VenueError {
    #[error("setup failed: {0}")]
    Setup(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: String,
        #[source]
        source: std::io::Error,
    },
}
