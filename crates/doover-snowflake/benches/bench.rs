use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use doover_snowflake::{
    DOOVER_EPOCH_MILLIS, MessageWindow, Origin, RandSource, ShuffledCycle, SnowflakeGenerator,
    SnowflakeType, TimeSource, cursor_at, generate_snowflake_id, process_cycle,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: i64,
}

impl TimeSource for FixedMockTime {
    fn unix_millis(&self) -> i64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

const MOCK_MILLIS: i64 = DOOVER_EPOCH_MILLIS as i64 + 1;

/// Benchmarks a single generator on one thread.
fn bench_generator<T, R>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> SnowflakeGenerator<T, R>,
) where
    T: TimeSource,
    R: RandSource<u8>,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.generate_id(SnowflakeType::Message).unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads, all drawing from the same
/// cycle.
fn bench_generator_contended<T, R>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> SnowflakeGenerator<T, R>,
) where
    T: TimeSource + Send + Sync,
    R: RandSource<u8> + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{}/threads/{}", TOTAL_IDS, thread_count),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let generator = Arc::new(generator_fn());
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let generator = Arc::clone(&generator);
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(
                                            generator.generate_id(SnowflakeType::Message).unwrap(),
                                        );
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_mock_sequential(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/cycle", || {
        SnowflakeGenerator::with_sources(
            Origin::default(),
            FixedMockTime {
                millis: MOCK_MILLIS,
            },
            ShuffledCycle::from_seed(0),
        )
    });
}

fn benchmark_mock_contended(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/cycle", || {
        SnowflakeGenerator::with_sources(
            Origin::default(),
            FixedMockTime {
                millis: MOCK_MILLIS,
            },
            ShuffledCycle::from_seed(0),
        )
    });
}

fn benchmark_system_sequential(c: &mut Criterion) {
    bench_generator(c, "system/sequential/process_cycle", || {
        SnowflakeGenerator::new(Origin::default())
    });
}

fn benchmark_system_contended(c: &mut Criterion) {
    bench_generator_contended(c, "system/contended/process_cycle", || {
        SnowflakeGenerator::new(Origin::default())
    });
}

/// The free function validates its origin and reads the clock on every call.
fn benchmark_free_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("system/sequential/free_fn");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generate_snowflake_id(SnowflakeType::Message, 0, 0).unwrap());
            }
        });
    });
    group.finish();
}

fn benchmark_cycle_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function(format!("draw/{}", TOTAL_IDS), |b| {
        let cycle = process_cycle();
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(cycle.rand());
            }
        });
    });
    group.finish();
}

fn benchmark_cursors(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");
    group.bench_function("cursor_at", |b| {
        b.iter(|| black_box(cursor_at(black_box(MOCK_MILLIS)).unwrap()));
    });
    group.bench_function("window", |b| {
        b.iter(|| {
            black_box(
                MessageWindow::new(black_box(MOCK_MILLIS), black_box(MOCK_MILLIS + 60_000))
                    .unwrap(),
            )
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    // Mock clock
    benchmark_mock_sequential,
    benchmark_mock_contended,
    // System clock, process-wide cycle
    benchmark_system_sequential,
    benchmark_system_contended,
    benchmark_free_function,
    // Building blocks
    benchmark_cycle_draw,
    benchmark_cursors,
);
criterion_main!(benches);
