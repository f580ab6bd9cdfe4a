//! Pairwise footprint overlap and sun-angle comparison.
//!
//! Only pairs from the same instrument on different satellites are compared;
//! everything else stays zero in the matrices.

use crate::scene::{first_ring, SceneBatch, SceneProperties};
use chrono::{DateTime, Timelike, Utc};
use geo::bounding_rect::BoundingRect;
use geo::{Area, BooleanOps};
use geo_types::{Coord, LineString, Polygon, Rect};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Degrees of longitude per hour of solar time.
const DEGREES_PER_HOUR: f64 = 15.0;

/// Bounding-box test run before the exact polygon intersection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BboxCheck {
    /// `i.max >= j.min` on both axes for `i < j`. Never rejects a pair that
    /// overlaps, but lets through pairs where `j` lies entirely left of or
    /// below `i`.
    #[default]
    OneSided,
    /// Full interval overlap on both axes.
    Symmetric,
}

impl BboxCheck {
    fn passes(self, a: &Rect<f64>, b: &Rect<f64>) -> bool {
        let forward = a.max().x >= b.min().x && a.max().y >= b.min().y;
        match self {
            BboxCheck::OneSided => forward,
            BboxCheck::Symmetric => forward && b.max().x >= a.min().x && b.max().y >= a.min().y,
        }
    }
}

/// Symmetric n×n intersection-area and sun-angle-difference matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapMatrix {
    n: usize,
    area: Vec<f64>,
    sun_diff: Vec<f64>,
}

impl OverlapMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            area: vec![0.0; n * n],
            sun_diff: vec![0.0; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn area(&self, i: usize, j: usize) -> f64 {
        self.area[i * self.n + j]
    }

    pub fn sun_diff(&self, i: usize, j: usize) -> f64 {
        self.sun_diff[i * self.n + j]
    }

    fn set(&mut self, i: usize, j: usize, area: f64, sun_diff: f64) {
        let n = self.n;
        self.area[i * n + j] = area;
        self.area[j * n + i] = area;
        self.sun_diff[i * n + j] = sun_diff;
        self.sun_diff[j * n + i] = sun_diff;
    }

    /// Largest sun-angle disagreement of scene `i` with any overlapping
    /// eligible scene, 0 if there is none.
    pub fn max_sun_diff(&self, i: usize) -> f64 {
        self.sun_diff[i * self.n..(i + 1) * self.n]
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }

    pub fn max_sun_diffs(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.max_sun_diff(i)).collect()
    }
}

/// Everything derived from the filtered scene set, indexed like the batch.
#[derive(Clone, Debug)]
pub struct OverlapAnalysis {
    pub central_lon: Vec<f64>,
    pub central_lat: Vec<f64>,
    pub local_times: Vec<f64>,
    pub polygons: Vec<Polygon<f64>>,
    pub matrix: OverlapMatrix,
    /// Pairs that passed eligibility and the bbox test.
    pub exact_intersections: usize,
}

pub struct OverlapAnalyzer {
    bbox_check: BboxCheck,
}

impl OverlapAnalyzer {
    pub fn new() -> Self {
        Self {
            bbox_check: BboxCheck::OneSided,
        }
    }

    pub fn with_bbox_check(mut self, bbox_check: BboxCheck) -> Self {
        self.bbox_check = bbox_check;
        self
    }

    pub fn analyze(&self, batch: &SceneBatch) -> OverlapAnalysis {
        let (central_lon, central_lat) = central_coordinates(batch);
        let local_times = local_times(batch.properties(), &central_lon);
        let polygons = geometries_to_polygons(batch);
        let (matrix, exact_intersections) =
            calculate_intersections(&polygons, batch.properties(), self.bbox_check);

        log::debug!(
            "Compared {} scene(s): {} exact intersection(s)",
            batch.len(),
            exact_intersections
        );

        OverlapAnalysis {
            central_lon,
            central_lat,
            local_times,
            polygons,
            matrix,
            exact_intersections,
        }
    }
}

impl Default for OverlapAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertex mean of the exterior ring, closing vertex included. Not an
/// area-weighted centroid.
pub fn central_coordinate(geometry: &geojson::Geometry) -> (f64, f64) {
    let ring = first_ring(geometry).unwrap_or(&[]);
    if ring.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = ring.len() as f64;
    let lon = ring.iter().map(|p| p[0]).sum::<f64>() / n;
    let lat = ring.iter().map(|p| p[1]).sum::<f64>() / n;
    (lon, lat)
}

pub fn central_coordinates(batch: &SceneBatch) -> (Vec<f64>, Vec<f64>) {
    batch.geometries().iter().map(central_coordinate).unzip()
}

/// Fractional UTC hour of the acquisition.
pub fn utc_hours(acquired: &DateTime<Utc>) -> f64 {
    let seconds = acquired.second() as f64 + acquired.nanosecond() as f64 / 1e9;
    acquired.hour() as f64 + acquired.minute() as f64 / 60.0 + seconds / 3600.0
}

/// Solar local time approximated from longitude alone. Not wrapped to 0..24.
pub fn local_time(acquired: &DateTime<Utc>, central_lon: f64) -> f64 {
    utc_hours(acquired) + central_lon / DEGREES_PER_HOUR
}

pub fn local_times(properties: &[SceneProperties], central_lon: &[f64]) -> Vec<f64> {
    properties
        .iter()
        .zip(central_lon)
        .map(|(p, &lon)| local_time(&p.acquired, lon))
        .collect()
}

/// Polygon from the first ring of a GeoJSON footprint. Footprints without a
/// ring give an empty polygon.
pub fn to_polygon(geometry: &geojson::Geometry) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = first_ring(geometry)
        .unwrap_or(&[])
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect();
    Polygon::new(LineString::new(coords), vec![])
}

pub fn geometries_to_polygons(batch: &SceneBatch) -> Vec<Polygon<f64>> {
    batch.geometries().iter().map(to_polygon).collect()
}

/// Same sensor type on a different physical satellite.
pub fn is_eligible_pair(a: &SceneProperties, b: &SceneProperties) -> bool {
    a.instrument == b.instrument && a.satellite_id != b.satellite_id
}

/// Fills both matrices for every eligible pair whose footprints intersect
/// with positive area. Returns the matrix and how many exact intersections
/// were computed.
pub fn calculate_intersections(
    polygons: &[Polygon<f64>],
    properties: &[SceneProperties],
    bbox_check: BboxCheck,
) -> (OverlapMatrix, usize) {
    let n = polygons.len().min(properties.len());
    let bboxes: Vec<Option<Rect<f64>>> = polygons[..n].iter().map(|p| p.bounding_rect()).collect();
    let sun_angles: Vec<f64> = properties[..n].iter().map(SceneProperties::sun_angle).collect();

    // (j, area, sun_diff) for each j > i, plus the exact-test count
    let row_hits = |i: usize| -> (Vec<(usize, f64, f64)>, usize) {
        let mut hits = Vec::new();
        let mut exact = 0;
        let Some(bi) = bboxes[i] else {
            return (hits, exact);
        };
        for j in (i + 1)..n {
            if !is_eligible_pair(&properties[i], &properties[j]) {
                continue;
            }
            let Some(bj) = bboxes[j] else { continue };
            if !bbox_check.passes(&bi, &bj) {
                continue;
            }
            exact += 1;
            let area = polygons[i].intersection(&polygons[j]).unsigned_area();
            if area > 0.0 {
                hits.push((j, area, (sun_angles[i] - sun_angles[j]).abs()));
            }
        }
        (hits, exact)
    };

    let rows: Vec<(Vec<(usize, f64, f64)>, usize)>;
    #[cfg(feature = "parallel")]
    {
        rows = (0..n).into_par_iter().map(row_hits).collect();
    }
    #[cfg(not(feature = "parallel"))]
    {
        rows = (0..n).map(row_hits).collect();
    }

    let mut matrix = OverlapMatrix::zeros(n);
    let mut exact_total = 0;
    for (i, (hits, exact)) in rows.into_iter().enumerate() {
        exact_total += exact;
        for (j, area, sun_diff) in hits {
            matrix.set(i, j, area, sun_diff);
        }
    }
    (matrix, exact_total)
}

#[cfg(test)]
#[path = "overlap_tests.rs"]
mod tests;
