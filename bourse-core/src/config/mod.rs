//! Venue configuration
//!
//! Every field has a default matching the classic three-trader setup, so an
//! empty JSON object is a valid config file. Binaries load the file (if any),
//! apply CLI overrides, then call `validate()` before building the venue.

use crate::core::{ConfigError, Symbol};
use crate::ledger::LogOrder;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
pub const DEFAULT_INITIAL_BALANCE: Decimal = dec!(10000.00);
pub const DEFAULT_THINK_TIME_MIN_MS: u64 = 100;
pub const DEFAULT_THINK_TIME_MAX_MS: u64 = 300;
pub const DEFAULT_QUOTE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_SYMBOLS: [&str; 5] = ["AAPL", "GOOG", "TSLA", "MSFT", "AMZN"];
pub const DEFAULT_PRICE_MIN: u32 = 100;
pub const DEFAULT_PRICE_MAX: u32 = 500;

/// Upper bound on the worker pool
pub const MAX_WORKERS: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VenueConfig {
    /// Trader worker threads
    pub workers: usize,
    /// Bounded queue capacity
    pub queue_capacity: usize,
    /// Starting wallet balance
    pub initial_balance: Decimal,
    /// Think-time pause bounds after each quote (inclusive)
    pub think_time_min_ms: u64,
    pub think_time_max_ms: u64,
    /// Producer emit interval
    pub quote_interval_ms: u64,
    /// Transaction log order in the final report
    pub log_order: LogOrder,
    /// Symbol alphabet for generated quotes
    pub symbols: Vec<String>,
    /// Generated price range in whole units, `[price_min, price_max)`
    pub price_min: u32,
    pub price_max: u32,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            think_time_min_ms: DEFAULT_THINK_TIME_MIN_MS,
            think_time_max_ms: DEFAULT_THINK_TIME_MAX_MS,
            quote_interval_ms: DEFAULT_QUOTE_INTERVAL_MS,
            log_order: LogOrder::default(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            price_min: DEFAULT_PRICE_MIN,
            price_max: DEFAULT_PRICE_MAX,
        }
    }
}

impl VenueConfig {
    /// Load a JSON config file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: VenueConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "workers must be in 1..={}, got {}",
                MAX_WORKERS, self.workers
            )));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue_capacity must be positive".to_string(),
            ));
        }

        if self.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "initial_balance must be positive, got {}",
                self.initial_balance
            )));
        }

        if self.think_time_min_ms > self.think_time_max_ms {
            return Err(ConfigError::Invalid(format!(
                "think time range {}..={}ms is inverted",
                self.think_time_min_ms, self.think_time_max_ms
            )));
        }

        if self.quote_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "quote_interval_ms must be positive".to_string(),
            ));
        }

        self.symbols()?;

        if self.price_min == 0 || self.price_min >= self.price_max {
            return Err(ConfigError::Invalid(format!(
                "price range [{}, {}) must be positive and non-empty",
                self.price_min, self.price_max
            )));
        }

        Ok(())
    }

    /// Parsed symbol alphabet
    pub fn symbols(&self) -> Result<Vec<Symbol>, ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("symbols must not be empty".to_string()));
        }

        self.symbols
            .iter()
            .map(|raw| Symbol::new(raw).map_err(|e| ConfigError::Invalid(e.to_string())))
            .collect()
    }

    pub fn think_time(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.think_time_min_ms),
            Duration::from_millis(self.think_time_max_ms),
        )
    }

    pub fn quote_interval(&self) -> Duration {
        Duration::from_millis(self.quote_interval_ms)
    }
}
