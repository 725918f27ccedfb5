//! Benchmarks for the matching engine.
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run a specific group
//! cargo bench -- single_match
//! ```
//!
//! Results land in `target/criterion/` with HTML reports.

use std::time::Duration;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};

use matchbook::{Order, OrderBook, OrderType, Side};

// ============================================================================
// Helpers: deterministic order generation
// ============================================================================

fn buy(id: u64, price: i64, quantity: u64) -> Order {
    Order::new(OrderType::GoodTillCancel, id, Side::Buy, price, quantity)
}

fn sell(id: u64, price: i64, quantity: u64) -> Order {
    Order::new(OrderType::GoodTillCancel, id, Side::Sell, price, quantity)
}

/// Seed the ask side with `count` orders at ascending price levels,
/// using ids `first_id..`.
fn populate_asks(book: &mut OrderBook, count: usize, base_price: i64, step: i64, quantity: u64, first_id: u64) {
    for i in 0..count {
        let price = base_price + i as i64 * step;
        book.add(sell(first_id + i as u64, price, quantity));
    }
}

/// Seed the bid side with `count` orders at descending price levels.
fn populate_bids(book: &mut OrderBook, count: usize, base_price: i64, step: i64, quantity: u64, first_id: u64) {
    for i in 0..count {
        let price = base_price - i as i64 * step;
        book.add(buy(first_id + i as u64, price, quantity));
    }
}

/// A reproducible batch of mixed orders around a common mid price.
fn generate_order_batch(count: usize, seed: u64) -> Vec<Order> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut orders = Vec::with_capacity(count);

    let base_price: i64 = 10_000;

    for i in 0..count {
        let is_buy = rng.gen_bool(0.5);
        let price = base_price + rng.gen_range(-500..=500);
        let quantity: u64 = rng.gen_range(1..=100);

        let order = if is_buy {
            buy((i + 1) as u64, price, quantity)
        } else {
            sell((i + 1) as u64, price, quantity)
        };
        orders.push(order);
    }

    orders
}

// ============================================================================
// Benchmark: single match latency
// ============================================================================

fn bench_single_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_match");

    group.measurement_time(Duration::from_secs(10));
    group.sample_size(1000);

    // Match a taker against a book with 1,000 resting asks.
    group.bench_function("against_1k_orders", |b| {
        let mut book = OrderBook::with_capacity(2000);
        populate_asks(&mut book, 1000, 10_000, 1, 100, 1);
        let mut next_id = 1_000_000u64;

        b.iter_batched(
            || {
                next_id += 1;
                buy(next_id, 10_000, 100)
            },
            |taker| black_box(book.add(taker)),
            BatchSize::SmallInput,
        );
    });

    // A taker large enough to sweep roughly ten price levels.
    group.bench_function("multi_level_sweep", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(200);
                populate_asks(&mut book, 100, 10_000, 1, 10, 1);
                let taker = buy(999_999, 10_010, 100);
                (book, taker)
            },
            |(mut book, taker)| black_box(book.add(taker)),
            BatchSize::SmallInput,
        );
    });

    // No cross: the order rests on the book.
    group.bench_function("no_match_rest_on_book", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(2000);
                populate_asks(&mut book, 1000, 10_000, 1, 100, 1);
                let resting = buy(999_999, 9_000, 100);
                (book, resting)
            },
            |(mut book, resting)| black_box(book.add(resting)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// Benchmark: order operations
// ============================================================================

fn bench_order_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_operations");

    group.measurement_time(Duration::from_secs(5));

    group.bench_function("add_to_empty", |b| {
        b.iter_batched(
            OrderBook::new,
            |mut book| black_box(book.add(buy(1, 10_000, 100))),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("add_to_1k_book", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(2000);
                populate_asks(&mut book, 500, 10_000, 1, 100, 1);
                populate_bids(&mut book, 500, 9_999, 1, 100, 1_001);
                book
            },
            |mut book| black_box(book.add(buy(999_999, 9_000, 100))),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cancel_order", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(2000);
                populate_bids(&mut book, 1000, 10_000, 1, 100, 1);
                book
            },
            |mut book| {
                // Cancel from the middle of the book.
                book.cancel(500);
                black_box(book.len())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// Benchmark: throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");

    group.measurement_time(Duration::from_secs(15));
    group.sample_size(50);

    for batch_size in [1_000, 10_000, 50_000] {
        group.throughput(Throughput::Elements(batch_size as u64));

        group.bench_with_input(
            BenchmarkId::new("orders", batch_size),
            &batch_size,
            |b, &size| {
                let orders = generate_order_batch(size, 42);

                b.iter_batched(
                    || (OrderBook::with_capacity(size * 2), orders.clone()),
                    |(mut book, orders)| {
                        let mut trade_count = 0;
                        for order in orders {
                            trade_count += book.add(order).len();
                        }
                        black_box((book.len(), trade_count))
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_match,
    bench_order_operations,
    bench_throughput
);
criterion_main!(benches);
