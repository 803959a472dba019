//! Benchmarks for geo crate distance calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nextfinish_geo::{calculate_distances, haversine_distance, Coordinate};

fn grid_around_leipzig(count: usize) -> Vec<Option<Coordinate>> {
    (0..count)
        .map(|i| {
            // Every tenth event has no coordinates, like a partly geocoded catalog
            if i % 10 == 0 {
                return None;
            }
            let lat = 50.0 + (i as f64 * 0.01) % 3.0;
            let lng = 11.0 + (i as f64 * 0.01) % 3.0;
            Some(Coordinate::new(lat, lng))
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let leipzig = Coordinate::new(51.3397, 12.3731);
    let berlin = Coordinate::new(52.5200, 13.4050);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance(black_box(&leipzig), black_box(&berlin)))
    });
}

fn bench_batch_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_distances");
    let anchor = Coordinate::new(51.3397, 12.3731);

    for size in [100, 1_000, 10_000] {
        let points = grid_around_leipzig(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| calculate_distances(black_box(&anchor), black_box(points)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_batch_distances);
criterion_main!(benches);
