//! Common utilities for all binaries
//!
//! Shared initialization, CLI parsing, and setup code.

use anyhow::{Context, Result};
use bourse_core::config::VenueConfig;
use bourse_core::engine::{ShutdownCoordinator, ShutdownReason, VenueReport};
use bourse_core::ledger::LogOrder;
use clap::{Args, Parser, ValueEnum};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging flags shared by every binary
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log level (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

/// Where quotes come from
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Spawn the external market process and read its stdout
    Process,
    /// Generate quotes on a thread inside the venue
    Synthetic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    BuyOne,
    PriceLimit,
    TakeProfit,
}

/// Venue CLI
#[derive(Parser, Debug)]
#[command(author, version, about = "Miniature concurrent trading venue")]
pub struct VenueArgs {
    /// JSON config file; CLI flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of trader threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Quote queue capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Starting wallet balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    #[arg(long)]
    pub think_min_ms: Option<u64>,

    #[arg(long)]
    pub think_max_ms: Option<u64>,

    /// Milliseconds between generated quotes
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Comma-separated symbol alphabet for generated quotes
    #[arg(long, value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    #[arg(long)]
    pub price_min: Option<u32>,

    #[arg(long)]
    pub price_max: Option<u32>,

    /// Print the transaction log oldest first
    #[arg(long)]
    pub chronological: bool,

    #[arg(long, value_enum, default_value_t = SourceKind::Process)]
    pub source: SourceKind,

    /// Market process to spawn (defaults to bourse-market next to this binary)
    #[arg(long)]
    pub market_cmd: Option<PathBuf>,

    /// Replay a captured quote file instead of a live source
    #[arg(long, conflicts_with = "source")]
    pub replay: Option<PathBuf>,

    /// Seed for generated quotes
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = StrategyKind::BuyOne)]
    pub strategy: StrategyKind,

    /// Price limit for the price-limit strategy
    #[arg(long, default_value = "200.00")]
    pub limit: Decimal,

    /// Lot size for the price-limit strategy
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,

    /// Buy threshold for the take-profit strategy
    #[arg(long, default_value = "150.00")]
    pub buy_below: Decimal,

    /// Sell threshold for the take-profit strategy
    #[arg(long, default_value = "400.00")]
    pub sell_above: Decimal,

    /// Print prometheus metrics at shutdown
    #[arg(long)]
    pub metrics: bool,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    pub report_json: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl VenueArgs {
    /// Config file (or defaults) with CLI overrides applied, validated
    pub fn resolve_config(&self) -> Result<VenueConfig> {
        let mut config = match &self.config {
            Some(path) => VenueConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => VenueConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(capacity) = self.capacity {
            config.queue_capacity = capacity;
        }
        if let Some(balance) = self.balance {
            config.initial_balance = balance;
        }
        if let Some(min) = self.think_min_ms {
            config.think_time_min_ms = min;
        }
        if let Some(max) = self.think_max_ms {
            config.think_time_max_ms = max;
        }
        if let Some(interval) = self.interval_ms {
            config.quote_interval_ms = interval;
        }
        if let Some(symbols) = &self.symbols {
            config.symbols = symbols.clone();
        }
        if let Some(min) = self.price_min {
            config.price_min = min;
        }
        if let Some(max) = self.price_max {
            config.price_max = max;
        }
        if self.chronological {
            config.log_order = LogOrder::Chronological;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Initialize tracing/logging
///
/// Logs go to stderr; stdout carries the report (and quote records for the
/// market process).
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let layer = if json {
        fmt::layer()
            .json()
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();

    Ok(())
}

/// Hands a Ctrl-C to the venue's shutdown coordinator
///
/// The handler is installed before the venue spawns anything, when no
/// coordinator exists yet. An interrupt that arrives first is held and
/// delivered the moment a coordinator is attached.
#[derive(Clone, Default)]
pub struct InterruptRelay {
    slot: Arc<Mutex<RelaySlot>>,
}

#[derive(Default)]
struct RelaySlot {
    coordinator: Option<ShutdownCoordinator>,
    pending: bool,
}

impl InterruptRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register this relay as the process Ctrl-C handler
    ///
    /// `ctrlc` allows one handler per process, so this is called once per run.
    pub fn install(&self) -> Result<()> {
        let relay = self.clone();
        ctrlc::set_handler(move || relay.interrupt()).context("installing Ctrl-C handler")?;
        Ok(())
    }

    /// Deliver an interrupt now, or hold it until a coordinator is attached
    pub fn interrupt(&self) {
        let mut slot = self.slot.lock();
        match &slot.coordinator {
            Some(coordinator) => {
                coordinator.trigger(ShutdownReason::Interrupt);
            }
            None => {
                tracing::info!("Interrupted during startup, stopping once the venue is up");
                slot.pending = true;
            }
        }
    }

    pub fn attach(&self, coordinator: ShutdownCoordinator) {
        let mut slot = self.slot.lock();
        if slot.pending {
            coordinator.trigger(ShutdownReason::Interrupt);
        }
        slot.coordinator = Some(coordinator);
    }
}

/// Print the final report to stdout
pub fn print_report(report: &VenueReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report);
    }

    if !report.is_clean() {
        tracing::warn!(
            failed_workers = report.failed_workers.len(),
            audit = report.audit.as_deref().unwrap_or("ok"),
            "Venue finished with faults"
        );
    }
    Ok(())
}
