//! # Correlation Benchmarks
//!
//! Full read path cost for topics of growing size: decode, group, filter
//! and sort.
//!
//! | Stage | Complexity |
//! |-------|------------|
//! | Canonical ordering | O(n log n) |
//! | Grouping by `requestId` | O(n) |
//! | Newest-first sort | O(t log t) for t transactions |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lx_01_message_correlation::{MessageCorrelator, RawMessage};
use lynx_tests::fixtures::rebalance_feed;
use std::time::Duration;

fn bench_correlate_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("lx-01-correlation");
    group.measurement_time(Duration::from_secs(10));

    let correlator = MessageCorrelator::default();
    for requests in [10, 100, 1_000, 10_000] {
        let feed = rebalance_feed(requests);
        group.throughput(Throughput::Elements(feed.len() as u64));
        group.bench_with_input(BenchmarkId::new("correlate", requests), &feed, |b, feed| {
            b.iter(|| black_box(correlator.correlate(feed)))
        });
    }

    group.finish();
}

fn bench_correlate_shuffled_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("lx-01-correlation");

    let correlator = MessageCorrelator::default();
    // Reversed feed forces the canonical reordering to do real work
    let mut feed: Vec<RawMessage> = rebalance_feed(1_000);
    feed.reverse();
    group.throughput(Throughput::Elements(feed.len() as u64));
    group.bench_function("correlate_reversed_1000", |b| {
        b.iter(|| black_box(correlator.correlate(&feed)))
    });

    group.finish();
}

criterion_group!(benches, bench_correlate_feed, bench_correlate_shuffled_feed);
criterion_main!(benches);
