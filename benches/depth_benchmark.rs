//! Benchmarks for the depth chart frame pass

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depth_replay::chart::stack;
use depth_replay::{
    classify, ChartFrame, DepthChart, PriceLevel, ScrubQuery, Snapshot, SnapshotIndex,
};

fn create_snapshots(count: usize, levels: usize) -> Vec<Snapshot> {
    let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    (0..count)
        .map(|n| {
            let mut book = Vec::with_capacity(levels * 2);
            for i in 0..levels {
                let size = 1.0 + ((n + i) % 7) as f64;
                // shift the book every other snapshot so levels appear and vanish
                let shift = (n % 2) as f64 * 0.5;
                book.push(PriceLevel::bid(50_000.0 - i as f64 - shift, size));
                book.push(PriceLevel::ask(50_001.0 + i as f64 + shift, size));
            }
            Snapshot::new(start + Duration::seconds(n as i64), book)
        })
        .collect()
}

fn benchmark_locate(c: &mut Criterion) {
    let index = SnapshotIndex::new(create_snapshots(10_000, 5)).unwrap();
    let query = Utc.timestamp_opt(1_700_005_000, 500_000_000).unwrap();

    c.bench_function("locate_10000_snapshots", |b| {
        b.iter(|| {
            black_box(index.locate(black_box(ScrubQuery::Continuous(query))).unwrap());
        })
    });
}

fn benchmark_classify(c: &mut Criterion) {
    let index = SnapshotIndex::new(create_snapshots(2, 100)).unwrap();
    let state = index
        .locate(ScrubQuery::Pair {
            index: 0,
            blend: 0.4,
        })
        .unwrap();

    c.bench_function("classify_100_levels", |b| {
        b.iter(|| {
            black_box(classify(black_box(&state)));
        })
    });

    let bars = classify(&state);
    c.bench_function("stack_100_levels", |b| {
        b.iter(|| {
            black_box(stack(black_box(&bars)).unwrap());
        })
    });
}

fn benchmark_frame(c: &mut Criterion) {
    let index = SnapshotIndex::new(create_snapshots(100, 100)).unwrap();
    let mut chart = DepthChart::new(index, ChartFrame::default());
    let mut blend = 0.0;

    c.bench_function("render_frame_100_levels", |b| {
        b.iter(|| {
            blend = (blend + 0.05) % 1.0;
            black_box(chart.render(ScrubQuery::Pair { index: 10, blend }).is_ok());
        })
    });
}

criterion_group!(benches, benchmark_locate, benchmark_classify, benchmark_frame);
criterion_main!(benches);
