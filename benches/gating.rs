use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use log_governor::{Level, LogBackend, LogGovernor, LogRecord, LoggerIdentity, Marker};
use std::fmt::Display;
use std::sync::Arc;

/// Backend that accepts everything and drops it.
#[derive(Debug)]
struct NullBackend;

impl LogBackend for NullBackend {
    fn is_enabled(&self, _identity: &LoggerIdentity, _level: Level, _marker: Option<&Marker>) -> bool {
        true
    }

    fn forward(&self, identity: &LoggerIdentity, record: &LogRecord<'_>) {
        black_box((identity, record.template()));
    }
}

fn governor(non_critical: u64) -> LogGovernor {
    LogGovernor::builder()
        .with_backend(Arc::new(NullBackend))
        .with_default_limits(non_critical, 100)
        .with_global_limit(u64::MAX)
        .build()
        .unwrap()
}

/// Benchmark the gate decision with and without headroom
fn bench_single_threaded_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");
    group.throughput(Throughput::Elements(1000));

    for (name, limit) in [("within_limit", u64::MAX), ("over_limit", 1)] {
        group.bench_with_input(BenchmarkId::new("emit", name), &limit, |b, &limit| {
            let governor = governor(limit);
            let logger = governor.logger("bench");
            let user = "alice";
            let args: [&dyn Display; 1] = [&user];

            b.iter(|| {
                for _ in 0..1000 {
                    black_box(logger.emit(black_box(&LogRecord::info("user {}").with_args(&args))));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark multi-threaded gating on one shared logger
fn bench_concurrent_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            num_threads,
            |b, &num_threads| {
                let governor = governor(100);
                b.iter(|| {
                    let mut handles = vec![];
                    for _ in 0..num_threads {
                        let logger = governor.logger("shared");
                        handles.push(std::thread::spawn(move || {
                            for _ in 0..1000 {
                                black_box(logger.info(black_box("contended")));
                            }
                        }));
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark registry lookups for existing identities
fn bench_registry_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_lookup");
    group.throughput(Throughput::Elements(1000));

    let governor = governor(100);
    let names: Vec<String> = (0..1000).map(|i| format!("app::module{}", i)).collect();
    for name in &names {
        governor.logger(name.clone());
    }

    group.bench_function("by_name", |b| {
        b.iter(|| {
            for name in &names {
                black_box(governor.registry().get_or_create_by_name(black_box(name)));
            }
        })
    });

    group.finish();
}

/// Benchmark closing a window across many loggers
fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");

    for num_loggers in [100, 1000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("loggers", num_loggers),
            num_loggers,
            |b, &num_loggers| {
                let governor = governor(10);
                let loggers: Vec<_> = (0..num_loggers)
                    .map(|i| governor.logger(format!("app::module{}", i)))
                    .collect();

                b.iter(|| {
                    for logger in &loggers {
                        logger.debug("work");
                    }
                    black_box(governor.trigger_sweep_now())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_threaded_emit,
    bench_concurrent_emit,
    bench_registry_lookup,
    bench_sweep,
);
criterion_main!(benches);
