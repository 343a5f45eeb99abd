//! Kepler Sweep Benchmarks with 95% Confidence Intervals
//!
//! Statistical settings:
//! - Sample size: 100 iterations per benchmark
//! - Confidence intervals: 95% bootstrap CI
//!
//! Run with: cargo bench --bench kepler_benchmarks

use std::f64::consts::TAU;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kepler_sweep::prelude::*;

/// Scalar Newton-Raphson solve across the UI eccentricity range
fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("KeplerSolver");
    group.sample_size(100);
    group.confidence_level(0.95);

    let solver = KeplerSolver::new();
    for e in [0.0, 0.35, 0.85] {
        group.bench_with_input(BenchmarkId::new("solve", e), &e, |b, &e| {
            b.iter(|| solver.solve(black_box(2.5), black_box(e)));
        });
    }

    let anomalies: Vec<f64> = (0..500).map(|i| TAU * f64::from(i) / 499.0).collect();
    group.bench_function("solve_batch_500", |b| {
        b.iter(|| solver.solve_batch(black_box(&anomalies), black_box(0.85)));
    });

    group.finish();
}

/// Orbit curve sampling, recomputed on every eccentricity change
fn bench_orbit_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrbitCurve");
    group.sample_size(100);
    group.confidence_level(0.95);

    let computer = OrbitStateComputer::default();
    for samples in [100usize, 500, 2000] {
        group.bench_with_input(BenchmarkId::new("orbit_curve", samples), &samples, |b, &n| {
            let params = OrbitParameters::new(1.0, 0.6).unwrap_or_default();
            b.iter(|| computer.orbit_curve(black_box(&params), n));
        });
    }

    group.finish();
}

/// Full tick: clock advance, state computation, wedge record, snapshot
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("SimulationState");
    group.sample_size(100);
    group.confidence_level(0.95);

    group.bench_function("tick", |b| {
        let Ok(mut state) = SimulationState::new(&KeplerConfig::default()) else {
            return;
        };
        b.iter(|| black_box(state.tick()));
    });

    group.bench_function("tick_and_snapshot", |b| {
        let Ok(mut state) = SimulationState::new(&KeplerConfig::default()) else {
            return;
        };
        b.iter(|| {
            state.tick();
            black_box(state.snapshot())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_solve, bench_orbit_curve, bench_tick);
criterion_main!(benches);
