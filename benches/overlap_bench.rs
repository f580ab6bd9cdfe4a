use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_types::{LineString, Polygon};
use planet_overlap::overlap::{calculate_intersections, to_polygon};
use planet_overlap::{BboxCheck, SceneBatch, SceneProperties, SpatialTiler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Map;

fn random_scenes(n: usize, seed: u64) -> SceneBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut batch = SceneBatch::new();
    for k in 0..n {
        let x: f64 = rng.gen_range(0.0..10.0);
        let y: f64 = rng.gen_range(0.0..10.0);
        let (w, h): (f64, f64) = (rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0));
        let props = SceneProperties {
            acquired: "2023-06-01T18:30:00Z".parse().unwrap(),
            cloud_cover: 0.1,
            sun_elevation: rng.gen_range(10.0..70.0),
            view_angle: 1.0,
            instrument: "PS2".to_string(),
            satellite_id: format!("{}", rng.gen_range(0..8)),
            ground_control: true,
            quality_category: "standard".to_string(),
            extra: Map::new(),
        };
        let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![x, y],
            vec![x + w, y],
            vec![x + w, y + h],
            vec![x, y + h],
            vec![x, y],
        ]]));
        batch.push(props, geometry, format!("s{}", k));
    }
    batch
}

fn bench_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap");
    group.sample_size(10);

    for size in [100, 250, 500].iter() {
        let batch = random_scenes(*size, 7);
        let polygons: Vec<_> = batch.geometries().iter().map(to_polygon).collect();

        for (name, check) in [("one_sided", BboxCheck::OneSided), ("symmetric", BboxCheck::Symmetric)] {
            group.bench_with_input(BenchmarkId::new(name, size), size, |b, _| {
                b.iter(|| calculate_intersections(&polygons, batch.properties(), check));
            });
        }
    }
    group.finish();
}

fn bench_tiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiling");
    group.sample_size(10);

    // a 24-gon roughly 10° across
    let ring: Vec<(f64, f64)> = (0..=24)
        .map(|i| {
            let a = (i % 24) as f64 / 24.0 * std::f64::consts::TAU;
            (5.0 + 5.0 * a.cos(), 5.0 + 5.0 * a.sin())
        })
        .collect();
    let poly = Polygon::new(LineString::from(ring), vec![]);

    for tile_size in [2.0, 1.0, 0.5].iter() {
        group.bench_with_input(BenchmarkId::new("polygon", tile_size), tile_size, |b, &ts| {
            let tiler = SpatialTiler::new(ts).unwrap();
            b.iter(|| tiler.tile_polygon(&poly));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_overlap, bench_tiling);
criterion_main!(benches);
