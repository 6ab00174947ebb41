//! Ledger accounting under concurrency
//!
//! For every interleaving of trader threads:
//! - final balance == initial - sum(prices bought) + sum(prices sold)
//! - holdings == bought - sold
//! - log length == number of filled trades, each logged price matching its quote
//! - balance never goes negative

use bourse_core::core::{Quote, Side, Symbol};
use bourse_core::ledger::{Ledger, LogOrder, Order, TradeOutcome};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

fn quote(symbol: &str, cents: i64) -> Quote {
    Quote::new(Symbol::new(symbol).unwrap(), Decimal::new(cents, 2)).unwrap()
}

#[test]
fn test_concurrent_buys_never_overdraw() {
    let initial = dec!(1000.00);
    let ledger = Arc::new(Ledger::new(initial));

    // 8 traders x 50 quotes at 7.13 each, far more than the balance covers
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let q = quote("AAPL", 713);
                (0..50)
                    .filter_map(|_| match ledger.try_buy(&q) {
                        TradeOutcome::Bought(tx) => Some(tx.price),
                        TradeOutcome::InsufficientFunds { .. } => None,
                        other => panic!("unexpected outcome {:?}", other),
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let bought: Vec<Decimal> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let spent: Decimal = bought.iter().sum();

    let snapshot = ledger.snapshot();
    assert_eq!(bought.len(), 140); // floor(1000 / 7.13)
    assert_eq!(snapshot.balance, initial - spent);
    assert!(snapshot.balance >= Decimal::ZERO);
    assert!(snapshot.balance < dec!(7.13));
    assert_eq!(snapshot.holdings, bought.len() as u64);

    let log = ledger.transactions(LogOrder::Chronological);
    assert_eq!(log.len(), bought.len());
    assert!(log.iter().all(|tx| tx.kind == Side::Buy && tx.price == dec!(7.13)));
    assert_eq!(ledger.reconcile(), Ok(()));
}

#[test]
fn test_concurrent_mixed_sides_reconcile() {
    let ledger = Arc::new(Ledger::new(dec!(500.00)));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for n in 0..100i64 {
                    let q = quote("MSFT", 100 + (n * 37 + i * 11) % 900);
                    if (n + i) % 3 == 0 {
                        ledger.try_sell(&q);
                    } else {
                        ledger.try_buy(&q);
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let snapshot = ledger.snapshot();
    let log = ledger.transactions(LogOrder::Chronological);
    let buys = log.iter().filter(|tx| tx.kind == Side::Buy).count() as u64;
    let sells = log.iter().filter(|tx| tx.kind == Side::Sell).count() as u64;

    assert!(snapshot.balance >= Decimal::ZERO);
    assert_eq!(snapshot.holdings, buys - sells);
    assert_eq!(snapshot.trades, log.len());
    assert_eq!(ledger.reconcile(), Ok(()));
}

#[test]
fn test_newest_first_is_reverse_of_chronological() {
    let ledger = Ledger::new(dec!(1000.00));
    for cents in [1000, 2000, 3000] {
        ledger.try_buy(&quote("GOOG", cents));
    }

    let mut newest = ledger.transactions(LogOrder::NewestFirst);
    let chronological = ledger.transactions(LogOrder::Chronological);
    assert_eq!(newest[0].price, dec!(30.00));
    newest.reverse();
    assert_eq!(newest, chronological);
}

#[derive(Debug, Clone)]
enum Trade {
    Buy(i64, u32),
    Sell(i64, u32),
}

fn trade() -> impl Strategy<Value = Trade> {
    prop_oneof![
        (1i64..50_000, 1u32..5).prop_map(|(c, q)| Trade::Buy(c, q)),
        (1i64..50_000, 1u32..5).prop_map(|(c, q)| Trade::Sell(c, q)),
    ]
}

proptest! {
    #[test]
    fn prop_books_always_balance(
        initial_cents in 0i64..5_000_000,
        trades in prop::collection::vec(trade(), 0..100),
    ) {
        let initial = Decimal::new(initial_cents, 2);
        let ledger = Ledger::new(initial);
        let mut filled = 0usize;

        for t in trades {
            let (side, cents, qty) = match t {
                Trade::Buy(c, q) => (Side::Buy, c, q),
                Trade::Sell(c, q) => (Side::Sell, c, q),
            };
            let before = ledger.snapshot();
            let outcome = ledger.execute(&quote("TSLA", cents), Order::new(side, qty).unwrap());

            if outcome.is_filled() {
                filled += 1;
            } else {
                prop_assert_eq!(ledger.snapshot(), before);
            }
            prop_assert!(ledger.snapshot().balance >= Decimal::ZERO);
        }

        prop_assert_eq!(ledger.snapshot().trades, filled);
        prop_assert_eq!(ledger.reconcile(), Ok(()));
    }
}
