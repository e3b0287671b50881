//! Benchmarks for radius search and apartment aggregation on synthetic cities.
//!
//! Run with: `cargo bench --bench search --features synthetic`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use proximap::synthetic::SyntheticCity;
use proximap::{
    find_within_radius, nearby_apartments, ApartmentIndex, Category, DistanceMetric,
    ProximityEngine, SearchRequest,
};

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for count in [1_000, 10_000, 50_000] {
        let data = SyntheticCity::with_sizes(10, count).generate();
        let points = data.apartments.points();
        group.bench_with_input(BenchmarkId::new("bulk_load", count), &points, |b, pts| {
            b.iter(|| ApartmentIndex::build(pts));
        });
    }

    group.finish();
}

fn bench_amenity_radius(c: &mut Criterion) {
    let city = SyntheticCity::large();
    let data = city.generate();

    let mut group = c.benchmark_group("amenity_radius");
    for metric in [DistanceMetric::Haversine, DistanceMetric::Geodesic] {
        group.bench_function(BenchmarkId::new("find_within_radius", format!("{:?}", metric)), |b| {
            b.iter(|| find_within_radius(&city.origin, 5.0, data.amenities.as_slice(), metric));
        });
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let city = SyntheticCity::standard();
    let data = city.generate();
    let index = ApartmentIndex::build(&data.apartments.points());
    let metric = DistanceMetric::Haversine;

    let mut group = c.benchmark_group("aggregation");

    for radius in [1.0, 3.0, 5.0] {
        let matched = find_within_radius(&city.origin, radius, data.amenities.as_slice(), metric);
        let anchors: Vec<_> = matched.iter().map(|m| &m.amenity).collect();

        group.bench_with_input(BenchmarkId::new("indexed", radius), &anchors, |b, anchors| {
            b.iter(|| {
                nearby_apartments(
                    anchors.iter().copied(),
                    &index,
                    data.apartments.as_slice(),
                    radius,
                    metric,
                )
            });
        });

        // Every apartment against every anchor, as a baseline.
        group.bench_with_input(BenchmarkId::new("brute_force", radius), &anchors, |b, anchors| {
            b.iter(|| {
                data.apartments
                    .iter()
                    .filter(|apt| {
                        anchors
                            .iter()
                            .any(|a| metric.distance_km(&a.location, &apt.location) <= radius)
                    })
                    .count()
            });
        });
    }

    group.finish();
}

fn bench_full_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_search");

    for (name, city) in [
        ("standard", SyntheticCity::standard()),
        ("high_latitude", SyntheticCity::high_latitude()),
    ] {
        let data = city.generate();
        let engine = ProximityEngine::new(data.amenities, data.apartments);
        let request = SearchRequest::new(city.origin, 5.0, Category::all());

        group.bench_function(name, |b| {
            b.iter(|| engine.search(&request));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_index_build,
    bench_amenity_radius,
    bench_aggregation,
    bench_full_search
);
criterion_main!(benches);
