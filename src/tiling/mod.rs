//! Splitting oversized requests into provider-sized pieces.
//!
//! Spatial tiling cuts a polygon into a degree grid, temporal tiling cuts a
//! date range into fixed-length windows, and [`should_tile`] is the cheap gate
//! that decides whether either is worth doing.

pub mod decision;
pub mod spatial;
pub mod temporal;

pub use decision::{should_tile, TilingDecision};
pub use spatial::SpatialTiler;
pub use temporal::TemporalTiler;

use crate::aoi::AoiKind;
use geo_types::Rect;

pub const POLYGON_AREA_THRESHOLD_KM2: f64 = 2500.0;
pub const DATE_RANGE_THRESHOLD_DAYS: i64 = 30;
pub const POINT_DATE_THRESHOLD_DAYS: i64 = 3 * 365;

/// Equatorial length of one degree, used for all area estimates.
pub const KM_PER_DEGREE: f64 = 111.0;

pub fn date_threshold_days(kind: AoiKind) -> i64 {
    match kind {
        AoiKind::Point => POINT_DATE_THRESHOLD_DAYS,
        AoiKind::Polygon => DATE_RANGE_THRESHOLD_DAYS,
    }
}

/// Area of a lon/lat box in km², ignoring latitude shrinkage.
pub fn bbox_area_km2(bbox: &Rect<f64>) -> f64 {
    bbox.width() * bbox.height() * KM_PER_DEGREE * KM_PER_DEGREE
}

#[cfg(test)]
mod tests;
