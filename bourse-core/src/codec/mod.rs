//! Quote boundary wire format
//!
//! The producer writes one record per quote: `<SYMBOL> <price>` followed by a
//! NUL byte. Newline is accepted as a terminator too, so captured files and
//! line-oriented producers can be replayed. A pipe read may return several
//! records at once or split one record across two reads; `RecordDecoder`
//! buffers bytes until a terminator arrives.

use crate::core::{Quote, QuoteParseError};
use std::io::{self, Write};

/// Terminator written after every record
pub const RECORD_TERMINATOR: u8 = 0;

/// Longest record accepted before the buffered bytes are discarded
pub const MAX_RECORD_LEN: usize = 64;

#[inline]
fn is_terminator(byte: u8) -> bool {
    byte == RECORD_TERMINATOR || byte == b'\n'
}

/// Encode a quote as a terminated wire record
pub fn encode_record(quote: &Quote) -> Vec<u8> {
    let mut record = quote.to_string().into_bytes();
    record.push(RECORD_TERMINATOR);
    record
}

/// Write a terminated record to `out`
pub fn write_record<W: Write>(out: &mut W, quote: &Quote) -> io::Result<()> {
    out.write_all(&encode_record(quote))
}

/// Parse a single record (terminator already stripped)
pub fn parse_record(bytes: &[u8]) -> Result<Quote, QuoteParseError> {
    let text = std::str::from_utf8(bytes).map_err(|_| QuoteParseError::NotUtf8)?;
    text.parse()
}

/// Incremental record framer
#[derive(Debug)]
pub struct RecordDecoder {
    buf: Vec<u8>,
    max_len: usize,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::with_max_len(MAX_RECORD_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buf: Vec::with_capacity(max_len),
            max_len,
        }
    }

    /// Append raw bytes from the boundary
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet framed
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Next complete record, if one is buffered
    ///
    /// Empty records (back-to-back terminators, stray `\r`) are skipped.
    pub fn next_record(&mut self) -> Option<Result<Quote, QuoteParseError>> {
        loop {
            let Some(end) = self.buf.iter().position(|&b| is_terminator(b)) else {
                if self.buf.len() > self.max_len {
                    self.buf.clear();
                    return Some(Err(QuoteParseError::Overlong { max: self.max_len }));
                }
                return None;
            };

            let record: Vec<u8> = self.buf.drain(..=end).take(end).collect();
            if record.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            return Some(parse_record(&record));
        }
    }

    /// Flush a trailing unterminated record at end of stream
    pub fn finish(&mut self) -> Option<Result<Quote, QuoteParseError>> {
        if let Some(record) = self.next_record() {
            return Some(record);
        }

        let rest = std::mem::take(&mut self.buf);
        if rest.iter().all(|b| b.is_ascii_whitespace()) {
            return None;
        }

        Some(parse_record(&rest))
    }
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Symbol;
    use rust_decimal_macros::dec;

    fn quote(symbol: &str, price: rust_decimal::Decimal) -> Quote {
        Quote::new(Symbol::new(symbol).unwrap(), price).unwrap()
    }

    #[test]
    fn test_encode_record() {
        let record = encode_record(&quote("AAPL", dec!(150)));
        assert_eq!(record, b"AAPL 150.00\0");
    }

    #[test]
    fn test_round_trip() {
        let original = quote("TSLA", dec!(412.37));
        let record = encode_record(&original);

        let mut decoder = RecordDecoder::new();
        decoder.feed(&record);

        assert_eq!(decoder.next_record(), Some(Ok(original)));
        assert_eq!(decoder.next_record(), None);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_multiple_records_in_one_read() {
        let mut decoder = RecordDecoder::new();
        decoder.feed(b"AAPL 100.00\0GOOG 200.00\0MSFT 3");

        assert_eq!(decoder.next_record(), Some(Ok(quote("AAPL", dec!(100)))));
        assert_eq!(decoder.next_record(), Some(Ok(quote("GOOG", dec!(200)))));
        assert_eq!(decoder.next_record(), None);

        // Rest of the split record arrives in the next read
        decoder.feed(b"00.50\0");
        assert_eq!(decoder.next_record(), Some(Ok(quote("MSFT", dec!(300.50)))));
    }

    #[test]
    fn test_newline_terminated_and_blank_records() {
        let mut decoder = RecordDecoder::new();
        decoder.feed(b"\n\0AMZN 101.00\r\n\n");

        assert_eq!(decoder.next_record(), Some(Ok(quote("AMZN", dec!(101)))));
        assert_eq!(decoder.next_record(), None);
    }

    #[test]
    fn test_finish_flushes_trailing_record() {
        let mut decoder = RecordDecoder::new();
        decoder.feed(b"AAPL 120.00");

        assert_eq!(decoder.next_record(), None);
        assert_eq!(decoder.finish(), Some(Ok(quote("AAPL", dec!(120)))));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_malformed_record_does_not_poison_stream() {
        let mut decoder = RecordDecoder::new();
        decoder.feed(b"aapl 1.00\0GOOG 200.00\0");

        assert!(matches!(
            decoder.next_record(),
            Some(Err(QuoteParseError::InvalidSymbol { .. }))
        ));
        assert_eq!(decoder.next_record(), Some(Ok(quote("GOOG", dec!(200)))));
    }

    #[test]
    fn test_overlong_record_discarded() {
        let mut decoder = RecordDecoder::with_max_len(8);
        decoder.feed(b"AAAAAAAAAAAAAAAA");

        assert_eq!(
            decoder.next_record(),
            Some(Err(QuoteParseError::Overlong { max: 8 }))
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(parse_record(&[0xff, 0xfe]), Err(QuoteParseError::NotUtf8));
    }
}
