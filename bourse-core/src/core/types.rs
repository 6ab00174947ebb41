//! Venue value types
//!
//! Everything here is an immutable `Copy` value:
//! - `Symbol`: inline uppercase ticker, no heap allocation
//! - `Quote`: one price observation for a symbol
//! - `Side`: BUY / SELL
//! - `Transaction`: a completed trade as recorded in the ledger log

use super::errors::QuoteParseError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum ticker length in bytes
pub const SYMBOL_MAX_LEN: usize = 9;

/// Number of fractional digits carried by every price
pub const PRICE_SCALE: u32 = 2;

/// Ticker symbol stored inline (uppercase ASCII letters and digits, 1..=9 chars)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    bytes: [u8; SYMBOL_MAX_LEN],
    len: u8,
}

impl Symbol {
    /// Validate and build a symbol
    pub fn new(raw: &str) -> Result<Self, QuoteParseError> {
        if raw.is_empty() || raw.len() > SYMBOL_MAX_LEN {
            return Err(QuoteParseError::InvalidSymbol {
                symbol: raw.to_string(),
            });
        }

        if !raw
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(QuoteParseError::InvalidSymbol {
                symbol: raw.to_string(),
            });
        }

        let mut bytes = [0u8; SYMBOL_MAX_LEN];
        bytes[..raw.len()].copy_from_slice(raw.as_bytes());

        Ok(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored, so this cannot fail
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = QuoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = QuoteParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.as_str().to_string()
    }
}

/// A single price observation
///
/// Wire form is `<SYMBOL> <price>` with the price printed to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: Decimal,
}

impl Quote {
    /// Build a quote, rounding the price to two decimals
    ///
    /// Prices that are not strictly positive after rounding are rejected.
    pub fn new(symbol: Symbol, price: Decimal) -> Result<Self, QuoteParseError> {
        let price =
            price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);

        if price <= Decimal::ZERO {
            return Err(QuoteParseError::NonPositivePrice { price });
        }

        Ok(Self { symbol, price })
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.symbol, self.price)
    }
}

impl FromStr for Quote {
    type Err = QuoteParseError;

    /// Parse `<SYMBOL> <price>`, surrounding whitespace ignored
    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let mut fields = record.split_whitespace();

        let symbol = fields.next().ok_or(QuoteParseError::EmptyRecord)?;
        let price = fields.next().ok_or_else(|| QuoteParseError::MissingPrice {
            record: record.to_string(),
        })?;

        if fields.next().is_some() {
            return Err(QuoteParseError::TrailingInput {
                record: record.to_string(),
            });
        }

        let symbol = Symbol::new(symbol)?;
        let price = Decimal::from_str(price).map_err(|_| QuoteParseError::InvalidPrice {
            raw: price.to_string(),
        })?;

        Quote::new(symbol, price)
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: Side,
    pub symbol: Symbol,
    /// Always positive
    pub quantity: u32,
    pub price: Decimal,
}

impl Transaction {
    /// Cash value of the trade (price × quantity)
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | qty {} | {:.2}",
            self.kind, self.symbol, self.quantity, self.price
        )
    }
}
