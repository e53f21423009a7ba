mod common;
use common::*;
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use lob_core::prelude::*;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching for 10k crossing orders");
    group.throughput(Throughput::Elements(10_000));
    group.sample_size(10);
    group.bench_function("submit 10k crossing buys against resting sells", |b| {
        b.iter_batched(
            || {
                let registry = EngineRegistry::new(EngineConfig::default());
                let symbol: Symbol = Arc::from("BTC-USDT");
                for i in 0..10_000u64 {
                    registry
                        .submit(make_limit_order(&symbol, Side::Sell, 1000 + (i % 500), 10))
                        .unwrap();
                }
                (registry, symbol)
            },
            |(registry, symbol)| {
                for _ in 0..10_000u64 {
                    let _ = registry.submit(make_limit_order(&symbol, Side::Buy, 1500, 10));
                }
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn stress_multi_thread_benchmark(c: &mut Criterion) {
    let registry = Arc::new(EngineRegistry::new(EngineConfig::default()));
    let symbol: Symbol = Arc::from("BTC-USDT");

    let insert_counter = Arc::new(AtomicU64::new(0));
    let cancel_counter = Arc::new(AtomicU64::new(0));

    let mut group = c.benchmark_group("stress matching");
    group.throughput(Throughput::Elements(1));
    group.bench_function("multi-thread submit/cancel TPS", |b| {
        let running = Arc::new(AtomicBool::new(true));

        let registry_insert = Arc::clone(&registry);
        let symbol_insert = Arc::clone(&symbol);
        let insert_counter_clone = Arc::clone(&insert_counter);
        let insert_thread_running = running.clone();
        let insert_thread = thread::spawn(move || {
            let mut i = 0u64;
            while insert_thread_running.load(Ordering::Relaxed) {
                i += 1;
                let mut rng = rand::rng();
                let is_limit = rng.random_bool(0.3); // 30% Limit, 70% Market
                let is_buy = rng.random_bool(0.5);
                let side = if is_buy { Side::Buy } else { Side::Sell };
                let request = if is_limit {
                    make_limit_order(&symbol_insert, side, 1000 - (i % 500), 10)
                } else {
                    make_market_order(&symbol_insert, side, 10)
                };
                let _ = registry_insert.submit(request);
                insert_counter_clone.fetch_add(1, Ordering::Relaxed);
            }
        });

        let registry_cancel = Arc::clone(&registry);
        let symbol_cancel = Arc::clone(&symbol);
        let cancel_counter_clone = Arc::clone(&cancel_counter);
        let cancel_thread_running = running.clone();
        let cancel_thread = thread::spawn(move || {
            let mut rng = rand::rng();
            while cancel_thread_running.load(Ordering::Relaxed) {
                let random_id = rng.random_range(0..100_000_000);
                let _ = registry_cancel.cancel(&symbol_cancel, random_id);
                cancel_counter_clone.fetch_add(1, Ordering::Relaxed);
            }
        });

        b.iter(|| {
            let _ = registry.submit(make_limit_order(&symbol, Side::Buy, 1000, 10));
        });

        running.store(false, Ordering::Relaxed);
        insert_thread.join().unwrap();
        cancel_thread.join().unwrap();
    });
    group.finish();
}

criterion_group!(benches, bench_matching, stress_multi_thread_benchmark);
criterion_main!(benches);
