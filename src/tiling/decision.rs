use super::{date_threshold_days, POLYGON_AREA_THRESHOLD_KM2};
use crate::aoi::AoiKind;

pub const DEFAULT_SCENES_PER_DAY: f64 = 1.0;
pub const DEFAULT_SCENES_PER_KM2: f64 = 0.5;

/// Outcome of the tiling gate for one AOI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilingDecision {
    pub spatial: bool,
    pub temporal: bool,
    /// Larger of the day-based and area-based scene estimates.
    pub estimated_scenes: u64,
}

impl TilingDecision {
    pub fn needs_tiling(&self) -> bool {
        self.spatial || self.temporal
    }
}

pub fn estimate_scenes_by_days(days: i64, scenes_per_day: f64) -> u64 {
    (days.max(0) as f64 * scenes_per_day).max(0.0) as u64
}

/// Day-based estimate scaled by the share of scenes expected to pass the
/// cloud limit, `1 - max_cloud`.
pub fn estimate_clear_scenes(days: i64, scenes_per_day: f64, max_cloud: f64) -> u64 {
    (days.max(0) as f64 * scenes_per_day * (1.0 - max_cloud)).max(0.0) as u64
}

pub fn estimate_scenes_by_area(area_km2: f64, scenes_per_km2: f64) -> u64 {
    (area_km2.max(0.0) * scenes_per_km2).max(0.0) as u64
}

/// Decides whether an AOI needs spatial and/or temporal tiling.
///
/// Points never tile spatially. Both flags are monotonic: growing the area or
/// the day count can only turn them on.
pub fn should_tile(area_km2: f64, total_days: i64, kind: AoiKind) -> TilingDecision {
    let by_days = estimate_scenes_by_days(total_days, DEFAULT_SCENES_PER_DAY);
    let by_area = estimate_scenes_by_area(area_km2, DEFAULT_SCENES_PER_KM2);

    let spatial = match kind {
        AoiKind::Point => false,
        AoiKind::Polygon => area_km2 > POLYGON_AREA_THRESHOLD_KM2,
    };
    let temporal = total_days > date_threshold_days(kind);

    TilingDecision {
        spatial,
        temporal,
        estimated_scenes: by_days.max(by_area),
    }
}
