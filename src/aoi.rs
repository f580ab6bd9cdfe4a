//! Area-of-interest loading and normalization.
//!
//! Every AOI is carried as an explicit [`Aoi`] variant so that downstream
//! tiling can treat points (cheap, long date ranges) and polygons differently.

use crate::error::{OverlapError, Result};
use geo::{BooleanOps, ConvexHull};
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use geojson::GeoJson;
use std::convert::TryInto;
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default radius used to turn a point into a polygon (~1 km at the equator).
pub const DEFAULT_POINT_BUFFER_DEG: f64 = 0.01;

const BUFFER_SEGMENTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AoiKind {
    Point,
    Polygon,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Aoi {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
}

impl Aoi {
    pub fn kind(&self) -> AoiKind {
        match self {
            Aoi::Point(_) => AoiKind::Point,
            Aoi::Polygon(_) => AoiKind::Polygon,
        }
    }

    /// The polygon sent to the provider for this AOI.
    pub fn footprint(&self, buffer_deg: f64) -> Polygon<f64> {
        match self {
            Aoi::Point(pt) => buffer_point(*pt, buffer_deg),
            Aoi::Polygon(poly) => poly.clone(),
        }
    }
}

/// Where an AOI comes from: a GeoJSON file or a raw `lon,lat` pair.
#[derive(Clone, Debug, PartialEq)]
pub enum AoiSource {
    File(PathBuf),
    Point { lon: f64, lat: f64 },
}

impl FromStr for AoiSource {
    type Err = OverlapError;

    /// An existing file always wins, so `a,b.geojson` loads as a file.
    fn from_str(s: &str) -> Result<Self> {
        if Path::new(s).is_file() {
            return Ok(AoiSource::File(PathBuf::from(s)));
        }
        let Some((lon, lat)) = s.split_once(',') else {
            return Ok(AoiSource::File(PathBuf::from(s)));
        };
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| OverlapError::InvalidInput(format!("bad point coordinate '{}' in '{}'", v, s)))
        };
        Ok(AoiSource::Point {
            lon: parse(lon)?,
            lat: parse(lat)?,
        })
    }
}

/// Approximates a circle of `radius_deg` around `center`.
///
/// The buffer is in degrees, not meters, so the footprint narrows east-west
/// as latitude increases.
pub fn buffer_point(center: Point<f64>, radius_deg: f64) -> Polygon<f64> {
    let mut coords = Vec::with_capacity(BUFFER_SEGMENTS + 1);
    for i in 0..BUFFER_SEGMENTS {
        let angle = i as f64 * 2.0 * PI / BUFFER_SEGMENTS as f64;
        coords.push(Coord {
            x: center.x() + radius_deg * angle.cos(),
            y: center.y() + radius_deg * angle.sin(),
        });
    }
    coords.push(coords[0]);
    Polygon::new(LineString::new(coords), vec![])
}

/// Reads every point and polygon geometry from a GeoJSON file.
pub fn load_aoi_file(path: &Path) -> Result<Vec<Aoi>> {
    if !path.exists() {
        log::error!("AOI file not found: {}", path.display());
        return Err(OverlapError::AoiNotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    let geojson: GeoJson = text.parse()?;

    let geometries: Vec<geojson::Geometry> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.into_iter().filter_map(|f| f.geometry).collect(),
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    };

    let mut aois = Vec::new();
    for geom in geometries {
        let geo_geom: Geometry<f64> = geom.try_into()?;
        collect_aois(geo_geom, &mut aois);
    }

    if aois.is_empty() {
        log::warn!("AOI file is empty: {}", path.display());
    }
    Ok(aois)
}

fn collect_aois(geom: Geometry<f64>, out: &mut Vec<Aoi>) {
    match geom {
        Geometry::Point(pt) => out.push(Aoi::Point(pt)),
        Geometry::Polygon(poly) => out.push(Aoi::Polygon(poly)),
        Geometry::MultiPolygon(mpoly) => out.extend(mpoly.0.into_iter().map(Aoi::Polygon)),
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                collect_aois(g, out);
            }
        }
        other => log::warn!("Skipping unsupported AOI geometry: {}", geometry_name(&other)),
    }
}

fn geometry_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Result of reducing several AOI polygons to one.
#[derive(Clone, Debug, PartialEq)]
pub enum Unified {
    Single(Polygon<f64>),
    /// The union was multi-part; its convex hull stands in for it.
    ConvexHull(Polygon<f64>),
}

impl Unified {
    pub fn polygon(&self) -> &Polygon<f64> {
        match self {
            Unified::Single(p) | Unified::ConvexHull(p) => p,
        }
    }

    pub fn into_polygon(self) -> Polygon<f64> {
        match self {
            Unified::Single(p) | Unified::ConvexHull(p) => p,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Unified::ConvexHull(_))
    }
}

pub struct GeometryNormalizer {
    point_buffer_deg: f64,
}

impl GeometryNormalizer {
    pub fn new() -> Self {
        Self {
            point_buffer_deg: DEFAULT_POINT_BUFFER_DEG,
        }
    }

    pub fn with_point_buffer(mut self, buffer_deg: f64) -> Self {
        self.point_buffer_deg = buffer_deg;
        self
    }

    /// Loads all sources. Fails if a file is missing or nothing usable was found.
    pub fn load(&self, sources: &[AoiSource]) -> Result<Vec<Aoi>> {
        let mut aois = Vec::new();
        for source in sources {
            match source {
                AoiSource::File(path) => aois.extend(load_aoi_file(path)?),
                AoiSource::Point { lon, lat } => aois.push(Aoi::Point(Point::new(*lon, *lat))),
            }
        }

        if aois.is_empty() {
            return Err(OverlapError::InvalidInput("No valid AOIs loaded".to_string()));
        }
        log::info!("Loaded {} AOI(s)", aois.len());
        Ok(aois)
    }

    pub fn to_polygons(&self, aois: &[Aoi]) -> Vec<Polygon<f64>> {
        let points = aois.iter().filter(|a| a.kind() == AoiKind::Point).count();
        if points > 0 {
            log::info!(
                "Buffered {} point(s) into polygons with {}° radius",
                points,
                self.point_buffer_deg
            );
        }
        aois.iter().map(|a| a.footprint(self.point_buffer_deg)).collect()
    }

    /// Merges polygons into one. A disjoint union degrades to its convex hull.
    pub fn unify(&self, polygons: &[Polygon<f64>]) -> Result<Unified> {
        let Some((first, rest)) = polygons.split_first() else {
            return Err(OverlapError::InvalidInput("cannot unify an empty AOI set".to_string()));
        };
        if rest.is_empty() {
            return Ok(Unified::Single(first.clone()));
        }

        let mut merged = MultiPolygon::new(vec![first.clone()]);
        for poly in rest {
            merged = merged.union(&MultiPolygon::new(vec![poly.clone()]));
        }

        if merged.0.len() == 1 {
            return Ok(Unified::Single(merged.0.remove(0)));
        }

        log::warn!(
            "AOI union resulted in {} parts; using convex hull",
            merged.0.len()
        );
        let hull = if merged.0.is_empty() {
            MultiPolygon::new(polygons.to_vec()).convex_hull()
        } else {
            merged.convex_hull()
        };
        Ok(Unified::ConvexHull(hull))
    }
}

impl Default for GeometryNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "aoi_tests.rs"]
mod tests;
