//! Benchmark: quote pipeline hot spots
//!
//! What's Measured:
//! - Uncontended enqueue/dequeue on the bounded queue
//! - Producer → N consumer handoff through the condvar
//! - Ledger trade critical section
//! - Record framing and parsing

use bourse_core::codec::{encode_record, RecordDecoder};
use bourse_core::core::{Quote, StopToken, Symbol};
use bourse_core::ledger::Ledger;
use bourse_core::queue::BoundedQueue;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

fn quote(cents: i64) -> Quote {
    Quote::new(Symbol::new("AAPL").unwrap(), Decimal::new(cents, 2)).unwrap()
}

fn bench_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue/uncontended");

    let queue = BoundedQueue::new(16);
    let q = quote(12345);

    group.bench_function("enqueue_dequeue", |b| {
        b.iter(|| {
            queue.try_enqueue(black_box(q)).unwrap();
            black_box(queue.try_dequeue());
        });
    });

    let full = BoundedQueue::new(1);
    full.try_enqueue(q).unwrap();
    group.bench_function("enqueue_full_drop", |b| {
        b.iter(|| black_box(full.try_enqueue(black_box(q)).is_err()));
    });

    group.finish();
}

fn bench_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue/handoff");
    group.sample_size(20);

    const ITEMS: u64 = 10_000;
    group.throughput(Throughput::Elements(ITEMS));

    for consumers in [1usize, 3, 8] {
        group.bench_with_input(
            BenchmarkId::new("consumers", consumers),
            &consumers,
            |b, &consumers| {
                b.iter(|| {
                    let queue = Arc::new(BoundedQueue::new(64));
                    let stop = StopToken::new();

                    let handles: Vec<_> = (0..consumers)
                        .map(|_| {
                            let queue = Arc::clone(&queue);
                            let stop = stop.clone();
                            thread::spawn(move || {
                                let mut n = 0u64;
                                while queue.dequeue(&stop).is_some() {
                                    n += 1;
                                }
                                n
                            })
                        })
                        .collect();

                    let q = quote(10000);
                    let mut sent = 0;
                    while sent < ITEMS {
                        if queue.try_enqueue(q).is_ok() {
                            sent += 1;
                        } else {
                            thread::yield_now();
                        }
                    }

                    stop.cancel();
                    queue.wake_all();
                    let received: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
                    black_box(received);
                });
            },
        );
    }

    group.finish();
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");

    let q = quote(1);
    group.bench_function("try_buy", |b| {
        b.iter_batched(
            || Ledger::new(dec!(1000000.00)),
            |ledger| {
                for _ in 0..100 {
                    black_box(ledger.try_buy(&q));
                }
                ledger
            },
            criterion::BatchSize::SmallInput,
        );
    });

    let broke = Ledger::new(dec!(0.00));
    group.bench_function("try_buy_rejected", |b| {
        b.iter(|| black_box(broke.try_buy(&q)));
    });

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let bytes: Vec<u8> = (0..100).flat_map(|i| encode_record(&quote(10000 + i))).collect();
    group.throughput(Throughput::Elements(100));

    group.bench_function("decode_100_records", |b| {
        b.iter(|| {
            let mut decoder = RecordDecoder::new();
            decoder.feed(black_box(&bytes));
            let mut n = 0;
            while let Some(record) = decoder.next_record() {
                black_box(record.is_ok());
                n += 1;
            }
            n
        });
    });

    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_handoff, bench_ledger, bench_codec);
criterion_main!(benches);
