//! Random quote generator
//!
//! Picks a symbol uniformly from a fixed alphabet and a price uniformly from
//! `[price_min, price_max)` in whole cents. Used by the in-process source and
//! by the `bourse-market` producer binary.

use crate::core::{ConfigError, Quote, Symbol};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

pub struct QuoteGenerator {
    symbols: Vec<Symbol>,
    min_cents: i64,
    max_cents: i64,
    rng: StdRng,
}

impl QuoteGenerator {
    /// Generator seeded from system entropy
    pub fn new(symbols: Vec<Symbol>, price_min: u32, price_max: u32) -> Result<Self, ConfigError> {
        Self::build(symbols, price_min, price_max, StdRng::from_entropy())
    }

    /// Deterministic generator for tests and replays
    pub fn with_seed(
        symbols: Vec<Symbol>,
        price_min: u32,
        price_max: u32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::build(symbols, price_min, price_max, StdRng::seed_from_u64(seed))
    }

    fn build(
        symbols: Vec<Symbol>,
        price_min: u32,
        price_max: u32,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::Invalid(
                "quote generator needs at least one symbol".to_string(),
            ));
        }
        if price_min == 0 || price_min >= price_max {
            return Err(ConfigError::Invalid(format!(
                "price range [{}, {}) must be positive and non-empty",
                price_min, price_max
            )));
        }

        Ok(Self {
            symbols,
            min_cents: i64::from(price_min) * 100,
            max_cents: i64::from(price_max) * 100,
            rng,
        })
    }

    pub fn next_quote(&mut self) -> Quote {
        // Non-empty by construction
        let symbol = *self
            .symbols
            .choose(&mut self.rng)
            .unwrap_or(&self.symbols[0]);
        let cents = self.rng.gen_range(self.min_cents..self.max_cents);

        Quote {
            symbol,
            price: Decimal::new(cents, 2),
        }
    }
}

impl Iterator for QuoteGenerator {
    type Item = Quote;

    fn next(&mut self) -> Option<Quote> {
        Some(self.next_quote())
    }
}
