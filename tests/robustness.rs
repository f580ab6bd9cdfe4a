use geo::Area;
use geo_types::{LineString, Polygon};
use planet_overlap::overlap::central_coordinate;
use planet_overlap::tiling::spatial::grid_cells;
use planet_overlap::{OverlapAnalyzer, QualityFilter, SceneBatch, SpatialTiler};
use geo::bounding_rect::BoundingRect;
use geojson::FeatureCollection;
use serde_json::json;

fn tiled_area(tiles: &[Polygon<f64>]) -> f64 {
    tiles.iter().map(|t| t.unsigned_area()).sum()
}

#[test]
fn test_concave_polygon_tiles_reconstruct_area() {
    // L shape spanning a 3°x3° box
    let l_shape = Polygon::new(
        LineString::from(vec![(0.0, 0.0), (3.0, 0.0), (3.0, 1.0), (1.0, 1.0), (1.0, 3.0), (0.0, 3.0), (0.0, 0.0)]),
        vec![],
    );
    let tiles = SpatialTiler::new(1.0).unwrap().tile_polygon(&l_shape);

    assert_eq!(tiles.len(), 5);
    assert!((tiled_area(&tiles) - l_shape.unsigned_area()).abs() < 1e-9);
    assert!(tiles.iter().all(|t| t.unsigned_area() > 0.0));
}

#[test]
fn test_polygon_with_hole_tiles_reconstruct_area() {
    let ring = Polygon::new(
        LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
        vec![LineString::from(vec![(1.5, 1.5), (2.5, 1.5), (2.5, 2.5), (1.5, 2.5), (1.5, 1.5)])],
    );
    let tiles = SpatialTiler::new(1.0).unwrap().tile_polygon(&ring);

    assert!((tiled_area(&tiles) - 15.0).abs() < 1e-9);
}

#[test]
fn test_tiles_stay_inside_grid_cells() {
    let skewed = Polygon::new(
        LineString::from(vec![(0.3, 0.1), (2.9, 0.7), (2.2, 2.6), (0.1, 1.9), (0.3, 0.1)]),
        vec![],
    );
    let bbox = skewed.bounding_rect().unwrap();
    let cells = grid_cells(bbox, 0.75);
    let tiles = SpatialTiler::new(0.75).unwrap().tile_polygon(&skewed);

    for tile in &tiles {
        let tb = tile.bounding_rect().unwrap();
        let inside_some_cell = cells.iter().any(|c| {
            tb.min().x >= c.min().x - 1e-9
                && tb.min().y >= c.min().y - 1e-9
                && tb.max().x <= c.max().x + 1e-9
                && tb.max().y <= c.max().y + 1e-9
        });
        assert!(inside_some_cell, "tile {:?} crosses a cell boundary", tb);
    }
    assert!((tiled_area(&tiles) - skewed.unsigned_area()).abs() < 1e-9);
}

#[test]
fn test_degenerate_footprints_do_not_panic() {
    let fc: FeatureCollection = serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature", "id": "point",
                "geometry": {"type": "Point", "coordinates": [1.0, 1.0]},
                "properties": {
                    "acquired": "2023-06-01T10:00:00Z", "cloud_cover": 0.0, "sun_elevation": 30.0,
                    "instrument": "PS2", "satellite_id": "1"
                }
            },
            {
                "type": "Feature", "id": "sliver",
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,0],[0,0]]]},
                "properties": {
                    "acquired": "2023-06-01T10:00:00Z", "cloud_cover": 0.0, "sun_elevation": 50.0,
                    "instrument": "PS2", "satellite_id": "2"
                }
            }
        ]
    }))
    .unwrap();
    let batch = SceneBatch::from_feature_collection(fc).unwrap();

    let (lon, lat) = central_coordinate(&batch.geometries()[0]);
    assert!(lon.is_nan() && lat.is_nan());

    let analysis = OverlapAnalyzer::new().analyze(&batch);
    assert_eq!(analysis.matrix.area(0, 1), 0.0);
    assert_eq!(analysis.matrix.max_sun_diffs(), vec![0.0, 0.0]);

    // missing ground control and quality category default to rejection
    assert!(QualityFilter::new().apply(&batch).is_empty());
}
