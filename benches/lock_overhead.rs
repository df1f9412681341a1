//! Lock Overhead Benchmark
//!
//! Compares guarded and unguarded runs of the same workload. The unguarded
//! runs lose updates; the difference in time is the price of correctness.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use race_harness::{ContentionHarness, RunConfig};

const WORKER_COUNTS: [usize; 3] = [1, 4, 16];
const INCREMENTS_PER_WORKER: u64 = 200;

fn bench_lock_overhead(c: &mut Criterion) {
    let harness = ContentionHarness::new();
    let mut group = c.benchmark_group("lock_overhead");
    group.sample_size(20);

    for workers in WORKER_COUNTS {
        for use_lock in [false, true] {
            let label = if use_lock { "locked" } else { "unlocked" };
            let config = RunConfig::new(workers, INCREMENTS_PER_WORKER, use_lock);

            group.bench_with_input(BenchmarkId::new(label, workers), &config, |b, config| {
                b.iter(|| {
                    let result = harness.run(black_box(config)).unwrap();
                    black_box(result.final_value)
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_lock_overhead);
criterion_main!(benches);
