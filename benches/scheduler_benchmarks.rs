//! Scheduler Benchmarks
//!
//! Measures the per-scheduling-point overhead of each `SchedulingStrategy`
//! in isolation from actor dispatch: how long it takes to pick the next
//! operation out of a moderately large enabled set.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::time::Duration;

// Layer 2: Third-party crate imports
use criterion::{criterion_group, criterion_main, Criterion};

// Layer 3: Internal module imports
use weft::{DfsStrategy, OperationId, PrioritizationStrategy, RandomStrategy, SchedulingStrategy};

const ENABLED_SET_SIZE: usize = 64;

fn enabled_set() -> Vec<OperationId> {
    (0..ENABLED_SET_SIZE).map(|_| OperationId::new()).collect()
}

fn random_strategy_next_operation(c: &mut Criterion) {
    let enabled = enabled_set();
    c.bench_function("random_strategy_next_operation", |b| {
        let mut strategy = RandomStrategy::new(42);
        b.iter(|| {
            let chosen = strategy.next_operation(black_box(&enabled), None);
            black_box(chosen);
        });
    });
}

fn dfs_strategy_next_operation(c: &mut Criterion) {
    let enabled = enabled_set();
    c.bench_function("dfs_strategy_next_operation", |b| {
        let mut strategy = DfsStrategy::new();
        b.iter(|| {
            let chosen = strategy.next_operation(black_box(&enabled), None);
            black_box(chosen);
        });
    });
}

fn fair_prioritization_strategy_next_operation(c: &mut Criterion) {
    let enabled = enabled_set();
    c.bench_function("fair_prioritization_strategy_next_operation", |b| {
        let mut strategy = PrioritizationStrategy::new(42, 3, true);
        b.iter(|| {
            let chosen = strategy.next_operation(black_box(&enabled), None);
            black_box(chosen);
        });
    });
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .without_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        random_strategy_next_operation,
        dfs_strategy_next_operation,
        fair_prioritization_strategy_next_operation
}

criterion_main!(benches);
