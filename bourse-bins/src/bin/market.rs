//! External market process
//!
//! Writes one NUL-terminated `<SYMBOL> <price>` record to stdout per interval
//! until killed, until `--count` records have been written, or until the
//! reader closes the pipe.

use anyhow::Result;
use bourse_bins::common::{init_logging, LogArgs};
use bourse_core::codec::write_record;
use bourse_core::config::{
    DEFAULT_PRICE_MAX, DEFAULT_PRICE_MIN, DEFAULT_QUOTE_INTERVAL_MS, DEFAULT_SYMBOLS,
};
use bourse_core::source::QuoteGenerator;
use bourse_core::Symbol;
use clap::Parser;
use std::io::{self, ErrorKind, Write};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Random quote producer for bourse-venue")]
struct MarketArgs {
    /// Milliseconds between records
    #[arg(long, default_value_t = DEFAULT_QUOTE_INTERVAL_MS)]
    interval_ms: u64,

    /// Comma-separated symbol alphabet
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SYMBOLS.map(String::from))]
    symbols: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_PRICE_MIN)]
    price_min: u32,

    #[arg(long, default_value_t = DEFAULT_PRICE_MAX)]
    price_max: u32,

    /// Stop after this many records
    #[arg(long)]
    count: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let args = MarketArgs::parse();
    init_logging(&args.log.log_level, args.log.json_logs)?;

    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::new(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let generator = match args.seed {
        Some(seed) => QuoteGenerator::with_seed(symbols, args.price_min, args.price_max, seed)?,
        None => QuoteGenerator::new(symbols, args.price_min, args.price_max)?,
    };

    let interval = Duration::from_millis(args.interval_ms);
    let limit = args.count.unwrap_or(u64::MAX);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut written = 0u64;

    tracing::info!(interval_ms = args.interval_ms, "Market open");

    for quote in generator.take(limit.try_into().unwrap_or(usize::MAX)) {
        let result = write_record(&mut out, &quote).and_then(|()| out.flush());
        match result {
            Ok(()) => written += 1,
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::info!("Reader closed the pipe");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(symbol = %quote.symbol, price = %quote.price, "Quote published");

        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }

    tracing::info!(written, "Market closed");
    Ok(())
}
