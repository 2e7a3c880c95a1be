use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stop_reconciler::markers::MarkerCluster;
use stop_reconciler::models::{StopKind, StopRecord};

/// A grid of stops where every fifth one shares its coordinate with a
/// neighbour, as platforms of the same station often do.
fn synthetic_records(count: usize) -> Vec<StopRecord> {
    (0..count)
        .map(|i| {
            let cell = if i % 5 == 1 { i - 1 } else { i };
            #[allow(clippy::cast_precision_loss)]
            let (lat, lon) = (46.0 + (cell / 100) as f64 * 0.001, 7.0 + (cell % 100) as f64 * 0.001);
            let matched = i % 2 == 0;
            StopRecord {
                id: i64::try_from(i).unwrap_or(i64::MAX),
                stop_type: if matched { StopKind::Matched } else { StopKind::Unmatched },
                atlas_lat: Some(lat),
                atlas_lon: Some(lon),
                osm_lat: matched.then_some(lat + 0.000_05),
                osm_lon: matched.then_some(lon),
                ..StopRecord::default()
            }
        })
        .collect()
}

fn benchmark_cluster_layout(c: &mut Criterion) {
    let records = synthetic_records(5_000);

    c.bench_function("cluster_build", |b| {
        b.iter(|| MarkerCluster::from_records(black_box(&records)));
    });

    let cluster = MarkerCluster::from_records(&records);
    c.bench_function("cluster_layout", |b| {
        b.iter(|| black_box(&cluster).layout());
    });

    // Full reload path: bucketing plus spreading
    c.bench_function("cluster_full", |b| {
        b.iter(|| MarkerCluster::from_records(black_box(&records)).layout());
    });
}

criterion_group!(benches, benchmark_cluster_layout);
criterion_main!(benches);
