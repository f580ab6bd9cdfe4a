use super::{bbox_area_km2, POLYGON_AREA_THRESHOLD_KM2};
use crate::aoi::{buffer_point, Aoi, DEFAULT_POINT_BUFFER_DEG};
use crate::error::{OverlapError, Result};
use geo::bounding_rect::BoundingRect;
use geo::{Area, BooleanOps};
use geo_types::{Coord, Polygon, Rect};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const DEFAULT_TILE_SIZE_DEG: f64 = 1.0;

// Pieces below this area (deg²) are boolean-op slivers, not tiles.
const MIN_TILE_AREA: f64 = 1e-12;

pub struct SpatialTiler {
    tile_size: f64,
    point_buffer: f64,
}

impl SpatialTiler {
    /// Fails unless `tile_size` is a finite, positive number of degrees.
    pub fn new(tile_size: f64) -> Result<Self> {
        if !is_valid_tile_size(tile_size) {
            return Err(OverlapError::InvalidInput(format!(
                "tile size must be positive, got {}",
                tile_size
            )));
        }
        Ok(Self {
            tile_size,
            point_buffer: DEFAULT_POINT_BUFFER_DEG,
        })
    }

    pub fn with_point_buffer(mut self, buffer_deg: f64) -> Self {
        self.point_buffer = buffer_deg;
        self
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Points become their buffered footprint; polygons go through the grid.
    pub fn tile(&self, aoi: &Aoi) -> Vec<Polygon<f64>> {
        match aoi {
            Aoi::Point(pt) => vec![buffer_point(*pt, self.point_buffer)],
            Aoi::Polygon(poly) => self.tile_polygon(poly),
        }
    }

    pub fn tile_polygon(&self, poly: &Polygon<f64>) -> Vec<Polygon<f64>> {
        let Some(bbox) = poly.bounding_rect() else {
            log::warn!("Skipping empty AOI polygon");
            return Vec::new();
        };

        if bbox_area_km2(&bbox) <= POLYGON_AREA_THRESHOLD_KM2 {
            return vec![poly.clone()];
        }

        let cells = grid_cells(bbox, self.tile_size);

        // A polygon with the same area as its bbox is the bbox, so the clipped
        // cells are already the exact intersections.
        let bbox_area = bbox.width() * bbox.height();
        let rectangular = poly.interiors().is_empty()
            && (poly.unsigned_area() - bbox_area).abs() <= 1e-12 * bbox_area.max(1.0);

        let process_cell = |cell: Rect<f64>| -> Vec<Polygon<f64>> {
            if rectangular {
                return if cell.width() * cell.height() > MIN_TILE_AREA {
                    vec![cell.to_polygon()]
                } else {
                    Vec::new()
                };
            }
            cell.to_polygon()
                .intersection(poly)
                .0
                .into_iter()
                .filter(|piece| piece.unsigned_area() > MIN_TILE_AREA)
                .collect()
        };

        let tiles: Vec<Polygon<f64>>;
        #[cfg(feature = "parallel")]
        {
            tiles = cells.into_par_iter().flat_map(process_cell).collect();
        }
        #[cfg(not(feature = "parallel"))]
        {
            tiles = cells.into_iter().flat_map(process_cell).collect();
        }

        log::debug!(
            "Split AOI of {:.0} km² into {} tile(s) of {}°",
            bbox_area_km2(&bbox),
            tiles.len(),
            self.tile_size
        );
        tiles
    }
}

impl Default for SpatialTiler {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE_DEG,
            point_buffer: DEFAULT_POINT_BUFFER_DEG,
        }
    }
}

pub fn is_valid_tile_size(tile_size: f64) -> bool {
    tile_size.is_finite() && tile_size > 0.0
}

/// Square cells of `tile_size` anchored at the bbox minimum corner, row by
/// row from the south. Cells on the north and east edges are clipped to the
/// bbox. A non-positive or non-finite `tile_size` yields no cells.
pub fn grid_cells(bbox: Rect<f64>, tile_size: f64) -> Vec<Rect<f64>> {
    if !is_valid_tile_size(tile_size) {
        return Vec::new();
    }
    let min = bbox.min();
    let max = bbox.max();

    let cols = (bbox.width() / tile_size).ceil() as usize;
    let rows = (bbox.height() / tile_size).ceil() as usize;

    let mut cells = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let x0 = min.x + c as f64 * tile_size;
            let y0 = min.y + r as f64 * tile_size;
            let x1 = (x0 + tile_size).min(max.x);
            let y1 = (y0 + tile_size).min(max.y);

            cells.push(Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 }));
        }
    }
    cells
}
