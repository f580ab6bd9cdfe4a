use crate::aoi::{Aoi, AoiKind};
use crate::dates::DateRange;
use crate::tiling::decision::{estimate_clear_scenes, estimate_scenes_by_area, estimate_scenes_by_days};
use crate::tiling::spatial::grid_cells;
use crate::tiling::{should_tile, SpatialTiler, TemporalTiler};
use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use geo::bounding_rect::BoundingRect;
use geo::Area;
use geo_types::{Coord, LineString, Polygon, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]),
        vec![],
    )
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn assert_tiles_cover(poly: &Polygon<f64>, tiles: &[Polygon<f64>]) {
    let bbox = poly.bounding_rect().unwrap();
    let mut total = 0.0;
    for tile in tiles {
        let area = tile.unsigned_area();
        assert!(area > 0.0, "tile with zero area");
        let tb = tile.bounding_rect().unwrap();
        assert!(tb.min().x >= bbox.min().x - 1e-9 && tb.max().x <= bbox.max().x + 1e-9);
        assert!(tb.min().y >= bbox.min().y - 1e-9 && tb.max().y <= bbox.max().y + 1e-9);
        total += area;
    }
    assert_relative_eq!(total, poly.unsigned_area(), epsilon = 1e-9);
}

#[test]
fn test_adjacent_squares_tile_into_four_each() {
    // Two 2°x2° squares sharing the x=2 edge
    let tiler = SpatialTiler::new(1.0).unwrap();
    for sq in [square(0.0, 0.0, 2.0), square(2.0, 0.0, 2.0)] {
        let tiles = tiler.tile(&Aoi::Polygon(sq.clone()));
        assert_eq!(tiles.len(), 4);
        for t in &tiles {
            assert_relative_eq!(t.unsigned_area(), 1.0, epsilon = 1e-12);
        }
        assert_tiles_cover(&sq, &tiles);
    }
}

#[test]
fn test_small_polygon_untouched() {
    // 0.4° x 0.4° is ~1971 km², under the threshold
    let sq = square(10.0, 10.0, 0.4);
    let tiles = SpatialTiler::default().tile(&Aoi::Polygon(sq.clone()));
    assert_eq!(tiles, vec![sq]);
}

#[test]
fn test_point_bypasses_grid() {
    let aoi = Aoi::Point(geo_types::Point::new(100.0, 10.0));
    let tiles = SpatialTiler::new(0.001).unwrap().tile(&aoi);
    assert_eq!(tiles.len(), 1);
    assert!(tiles[0].unsigned_area() > 0.0);
}

#[test]
fn test_grid_anchored_at_min_corner() {
    let bbox = Rect::new(Coord { x: 0.5, y: -0.25 }, Coord { x: 3.0, y: 1.0 });
    let cells = grid_cells(bbox, 1.0);
    // 3 columns x 2 rows, last column and row clipped
    assert_eq!(cells.len(), 6);
    assert_eq!(cells[0].min(), Coord { x: 0.5, y: -0.25 });
    assert_relative_eq!(cells[2].max().x, 3.0);
    assert_relative_eq!(cells[2].width(), 0.5);
    assert_relative_eq!(cells[5].height(), 0.25);
}

#[test]
fn test_triangle_tiles_reconstruct_area() {
    let tri = Polygon::new(
        LineString::from(vec![(0.0, 0.0), (3.0, 0.0), (0.0, 3.0), (0.0, 0.0)]),
        vec![],
    );
    let tiles = SpatialTiler::new(1.0).unwrap().tile_polygon(&tri);
    // cells entirely above the hypotenuse are dropped
    assert!(tiles.len() < 9);
    assert_tiles_cover(&tri, &tiles);
}

#[test]
fn test_tiling_is_deterministic() {
    let tri = Polygon::new(
        LineString::from(vec![(0.3, 0.1), (4.1, 0.7), (1.2, 3.9), (0.3, 0.1)]),
        vec![],
    );
    let tiler = SpatialTiler::new(0.75).unwrap();
    assert_eq!(tiler.tile_polygon(&tri), tiler.tile_polygon(&tri));
}

#[test]
fn test_non_positive_tile_size_rejected() {
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = SpatialTiler::new(bad).err().expect("tile size should be rejected");
        assert!(err.is_input_error());
    }
    assert_eq!(SpatialTiler::new(0.25).unwrap().tile_size(), 0.25);

    let bbox = square(0.0, 0.0, 2.0).bounding_rect().unwrap();
    assert!(grid_cells(bbox, 0.0).is_empty());
    assert!(grid_cells(bbox, -0.5).is_empty());
    assert_eq!(grid_cells(bbox, 1.0).len(), 4);
}

#[test]
fn test_forty_five_days_two_slices() {
    let range = DateRange::new(day(2023, 1, 1), day(2023, 2, 14)).unwrap();
    assert_eq!(range.days(), 45);

    let slices = TemporalTiler::for_kind(AoiKind::Polygon).tile(&range);
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].days(), 30);
    assert_eq!(slices[1].days(), 15);
    assert_eq!(slices[0].start(), range.start());
    assert_eq!(slices[0].end() + Duration::days(1), slices[1].start());
    assert_eq!(slices[1].end(), range.end());
}

#[test]
fn test_point_no_tiling_under_3_years() {
    let range = DateRange::new(day(2023, 1, 1), day(2025, 12, 30)).unwrap();
    assert_eq!(range.days(), 1095);
    assert_eq!(TemporalTiler::for_kind(AoiKind::Point).tile(&range).len(), 1);
}

#[test]
fn test_point_tiling_over_3_years() {
    let range = DateRange::new(day(2020, 1, 1), day(2023, 12, 31)).unwrap();
    let slices = TemporalTiler::for_kind(AoiKind::Point).tile(&range);
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].days(), 1095);
}

#[test]
fn test_random_ranges_slice_exactly() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let start = day(2015, 1, 1) + Duration::days(rng.gen_range(0..3000));
        let end = start + Duration::days(rng.gen_range(0..400));
        let threshold = rng.gen_range(1..60);
        let range = DateRange::new(start, end).unwrap();

        let slices = TemporalTiler::with_threshold(threshold).tile(&range);

        let expected = if range.days() <= threshold {
            1
        } else {
            (range.days() + threshold - 1) / threshold
        };
        assert_eq!(slices.len() as i64, expected);
        assert_eq!(slices.first().unwrap().start(), start);
        assert_eq!(slices.last().unwrap().end(), end);
        assert_eq!(slices.iter().map(DateRange::days).sum::<i64>(), range.days());
        for pair in slices.windows(2) {
            assert_eq!(pair[0].end() + Duration::days(1), pair[1].start());
            assert_eq!(pair[0].days(), threshold);
        }
        for s in &slices {
            assert!(s.days() <= threshold);
        }
    }
}

#[test]
fn test_scene_estimation() {
    assert_eq!(estimate_scenes_by_area(5000.0, 0.5), 2500);
    assert_eq!(estimate_scenes_by_days(45, 1.5), 67);
    assert_eq!(estimate_scenes_by_days(-3, 1.0), 0);
}

#[test]
fn test_clear_scene_estimate_scales_with_cloud_limit() {
    assert_eq!(estimate_clear_scenes(45, 1.5, 0.5), 33);
    assert_eq!(estimate_clear_scenes(45, 1.5, 0.0), estimate_scenes_by_days(45, 1.5));
    assert_eq!(estimate_clear_scenes(45, 1.5, 1.0), 0);
    assert!(estimate_clear_scenes(100, 1.0, 0.2) > estimate_clear_scenes(100, 1.0, 0.6));
}

#[test]
fn test_decision_thresholds() {
    let small = should_tile(1000.0, 10, AoiKind::Polygon);
    assert!(!small.needs_tiling());

    let big = should_tile(2501.0, 31, AoiKind::Polygon);
    assert!(big.spatial && big.temporal);

    let point = should_tile(1e9, 1000, AoiKind::Point);
    assert!(!point.spatial);
    assert!(!point.temporal);
    assert!(should_tile(0.0, 1096, AoiKind::Point).temporal);
}

#[test]
fn test_decision_is_monotonic() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let area = rng.gen_range(0.0..10000.0);
        let days = rng.gen_range(0..2000);
        let kind = if rng.gen_bool(0.5) { AoiKind::Point } else { AoiKind::Polygon };
        let base = should_tile(area, days, kind);
        let grown = should_tile(area + rng.gen_range(0.0..5000.0), days + rng.gen_range(0..500), kind);
        assert!(!base.spatial || grown.spatial);
        assert!(!base.temporal || grown.temporal);
        assert!(grown.estimated_scenes >= base.estimated_scenes);
    }
}
