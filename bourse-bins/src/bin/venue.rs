//! Trading venue
//!
//! Reads quotes from the market process (or an in-process generator, or a
//! replay file), trades them on a pool of trader threads, and prints the final
//! ledger when the source ends or Ctrl-C arrives.

use anyhow::{Context, Result};
use bourse_bins::common::{
    init_logging, print_report, InterruptRelay, SourceKind, StrategyKind, VenueArgs,
};
use bourse_core::config::VenueConfig;
use bourse_core::engine::{Strategy, Venue, VenueReport};
use bourse_core::monitoring::VenueMetrics;
use bourse_core::resilience::install_panic_handler;
use bourse_core::source::{
    ProcessSource, QuoteGenerator, QuoteSource, ScriptedSource, SyntheticSource,
};
use bourse_strategies::{BuyOneIfAffordable, PriceLimitBuyer, TakeProfit};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    let args = VenueArgs::parse();

    init_logging(&args.log.log_level, args.log.json_logs)?;
    install_panic_handler();

    let interrupts = InterruptRelay::new();
    interrupts.install()?;

    let config = args.resolve_config()?;
    let venue = Venue::new(config, VenueMetrics::new()?)?;
    let source = build_source(&args, venue.config())?;

    tracing::info!("=== Bourse: {} source ===", source.name());

    let report = match args.strategy {
        StrategyKind::BuyOne => run(&venue, &interrupts, source, BuyOneIfAffordable)?,
        StrategyKind::PriceLimit => {
            run(&venue, &interrupts, source, PriceLimitBuyer::new(args.limit, args.quantity)?)?
        }
        StrategyKind::TakeProfit => {
            run(&venue, &interrupts, source, TakeProfit::new(args.buy_below, args.sell_above)?)?
        }
    };

    print_report(&report, args.report_json)?;

    if args.metrics {
        print!("{}", venue.metrics().render()?);
    }

    Ok(())
}

fn run<S>(
    venue: &Venue,
    interrupts: &InterruptRelay,
    source: Arc<dyn QuoteSource>,
    strategy: S,
) -> Result<VenueReport>
where
    S: Strategy + Clone + 'static,
{
    let running = venue.start(source, strategy).context("venue setup failed")?;
    interrupts.attach(running.coordinator());
    Ok(running.join())
}

fn build_source(args: &VenueArgs, config: &VenueConfig) -> Result<Arc<dyn QuoteSource>> {
    if let Some(path) = &args.replay {
        let source = ScriptedSource::from_file(path)
            .with_context(|| format!("opening replay file {}", path.display()))?;
        return Ok(Arc::new(source));
    }

    match args.source {
        SourceKind::Synthetic => {
            let symbols = config.symbols()?;
            let generator = match args.seed {
                Some(seed) => {
                    QuoteGenerator::with_seed(symbols, config.price_min, config.price_max, seed)?
                }
                None => QuoteGenerator::new(symbols, config.price_min, config.price_max)?,
            };
            Ok(Arc::new(SyntheticSource::new(generator, config.quote_interval())))
        }
        SourceKind::Process => {
            let program = match &args.market_cmd {
                Some(path) => path.clone(),
                None => default_market_cmd()?,
            };
            Ok(Arc::new(ProcessSource::new(program, market_args(args, config))))
        }
    }
}

/// `bourse-market` installed alongside this executable
fn default_market_cmd() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating current executable")?;
    Ok(exe.with_file_name(format!("bourse-market{}", std::env::consts::EXE_SUFFIX)))
}

/// Forward the generator settings to the market process
fn market_args(args: &VenueArgs, config: &VenueConfig) -> Vec<OsString> {
    let mut out: Vec<OsString> = vec![
        "--interval-ms".into(),
        config.quote_interval_ms.to_string().into(),
        "--symbols".into(),
        config.symbols.join(",").into(),
        "--price-min".into(),
        config.price_min.to_string().into(),
        "--price-max".into(),
        config.price_max.to_string().into(),
        "--log-level".into(),
        args.log.log_level.clone().into(),
    ];
    if let Some(seed) = args.seed {
        out.push("--seed".into());
        out.push(seed.to_string().into());
    }
    out
}
