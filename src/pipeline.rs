//! The end-to-end run: tile, search, merge, filter, compare, tabulate.

use crate::aoi::{Aoi, AoiKind, GeometryNormalizer, DEFAULT_POINT_BUFFER_DEG};
use crate::dates::{total_days, DateRange};
use crate::error::{OverlapError, Result};
use crate::overlap::{BboxCheck, OverlapAnalyzer};
use crate::quality::QualityFilter;
use crate::scene::{SceneMerger, SceneProperties};
use crate::search::filter::DEFAULT_ITEM_TYPE;
use crate::search::{validate_max_cloud, RetryPolicy, RetryingSearch, SceneSearch, SearchRequest};
use crate::table::{ResultTable, ResultTableBuilder};
use crate::tiling::spatial::{is_valid_tile_size, DEFAULT_TILE_SIZE_DEG};
use crate::tiling::decision::{estimate_clear_scenes, DEFAULT_SCENES_PER_DAY};
use crate::tiling::{bbox_area_km2, should_tile, SpatialTiler, TemporalTiler};
use geo::bounding_rect::BoundingRect;
use geo_types::Polygon;
use serde_json::Value as JsonValue;

pub const DEFAULT_MAX_CLOUD: f64 = 0.5;
pub const DEFAULT_MIN_SUN_ANGLE: f64 = 0.0;

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Spatial tile edge in degrees.
    pub tile_size: f64,
    pub point_buffer: f64,
    pub max_cloud: f64,
    pub min_sun_angle: f64,
    pub quality: QualityFilter,
    pub bbox_check: BboxCheck,
    /// Merge all polygon AOIs into one before tiling.
    pub unify_aois: bool,
    /// Drop repeated scene ids after merging.
    pub dedup_scenes: bool,
    pub item_type: String,
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE_DEG,
            point_buffer: DEFAULT_POINT_BUFFER_DEG,
            max_cloud: DEFAULT_MAX_CLOUD,
            min_sun_angle: DEFAULT_MIN_SUN_ANGLE,
            quality: QualityFilter::default(),
            bbox_check: BboxCheck::default(),
            unify_aois: false,
            dedup_scenes: false,
            item_type: DEFAULT_ITEM_TYPE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_point_buffer(mut self, buffer_deg: f64) -> Self {
        self.point_buffer = buffer_deg;
        self
    }

    pub fn with_max_cloud(mut self, max_cloud: f64) -> Self {
        self.max_cloud = max_cloud;
        self
    }

    pub fn with_min_sun_angle(mut self, min_sun_angle: f64) -> Self {
        self.min_sun_angle = min_sun_angle;
        self
    }

    pub fn with_quality(mut self, quality: QualityFilter) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_bbox_check(mut self, bbox_check: BboxCheck) -> Self {
        self.bbox_check = bbox_check;
        self
    }

    pub fn with_unified_aois(mut self, unify: bool) -> Self {
        self.unify_aois = unify;
        self
    }

    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup_scenes = dedup;
        self
    }

    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_tile_size(self.tile_size) {
            return Err(OverlapError::InvalidInput(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }
        if !(self.point_buffer.is_finite() && self.point_buffer > 0.0) {
            return Err(OverlapError::InvalidInput(format!(
                "point buffer must be positive, got {}",
                self.point_buffer
            )));
        }
        validate_max_cloud(self.max_cloud)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub table: ResultTable,
    /// Properties of every merged scene, before quality filtering.
    pub raw_properties: Vec<SceneProperties>,
    /// Number of search calls dispatched.
    pub requests: usize,
    /// Set when the AOI union had to fall back to a convex hull.
    pub degraded_geometry: bool,
}

impl PipelineOutput {
    pub fn raw_properties_json(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(&self.raw_properties)?)
    }
}

pub struct OverlapPipeline {
    config: PipelineConfig,
}

impl OverlapPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one search per (tile, date slice) pair, sequentially, and builds the
    /// result table from everything returned.
    ///
    /// Any input error or exhausted search aborts the run. Finding no scenes is
    /// not an error: the table is simply empty.
    pub fn run<S: SceneSearch>(
        &self,
        search: S,
        aois: &[Aoi],
        date_ranges: &[DateRange],
    ) -> Result<PipelineOutput> {
        self.config.validate()?;
        if aois.is_empty() {
            return Err(OverlapError::InvalidInput("No AOIs given".to_string()));
        }
        if date_ranges.is_empty() {
            return Err(OverlapError::InvalidInput("No date ranges given".to_string()));
        }

        let normalizer = GeometryNormalizer::new().with_point_buffer(self.config.point_buffer);
        let (aois, degraded_geometry) = self.prepare_aois(&normalizer, aois)?;
        let footprints = normalizer.to_polygons(&aois);
        let days = total_days(date_ranges);
        let spatial = SpatialTiler::new(self.config.tile_size)?.with_point_buffer(self.config.point_buffer);

        let mut dispatcher = RetryingSearch::new(search, self.config.retry);
        let mut merger = SceneMerger::new();

        for (aoi, footprint) in aois.iter().zip(footprints) {
            let area_km2 = footprint.bounding_rect().map_or(0.0, |r| bbox_area_km2(&r));
            let decision = should_tile(area_km2, days, aoi.kind());

            let tiles = if decision.spatial {
                spatial.tile(aoi)
            } else {
                vec![footprint]
            };
            let slices = if decision.temporal {
                let temporal = TemporalTiler::for_kind(aoi.kind());
                date_ranges.iter().flat_map(|r| temporal.tile(r)).collect()
            } else {
                date_ranges.to_vec()
            };

            log::info!(
                "{:?} AOI of {:.0} km², {} day(s): {} tile(s) x {} slice(s), ~{} scenes (~{} within cloud limit)",
                aoi.kind(),
                area_km2,
                days,
                tiles.len(),
                slices.len(),
                decision.estimated_scenes,
                estimate_clear_scenes(days, DEFAULT_SCENES_PER_DAY, self.config.max_cloud)
            );

            for tile in &tiles {
                for slice in &slices {
                    let request =
                        SearchRequest::new(tile.clone(), *slice, self.config.max_cloud, self.config.min_sun_angle)?;
                    merger.push(dispatcher.dispatch(&request)?);
                }
            }
        }

        let requests = merger.batches();
        let mut merged = merger.finish();
        log::info!("Merged {} scene(s) from {} request(s)", merged.len(), requests);
        if self.config.dedup_scenes {
            merged = merged.dedup_by_id();
        }

        let filtered = self.config.quality.apply(&merged);
        let analysis = OverlapAnalyzer::new()
            .with_bbox_check(self.config.bbox_check)
            .analyze(&filtered);
        let table = ResultTableBuilder::build(&filtered, &analysis);
        table.log_summary();

        let (raw_properties, _, _) = merged.into_parts();
        Ok(PipelineOutput {
            table,
            raw_properties,
            requests,
            degraded_geometry,
        })
    }

    fn prepare_aois(&self, normalizer: &GeometryNormalizer, aois: &[Aoi]) -> Result<(Vec<Aoi>, bool)> {
        let polygons: Vec<Polygon<f64>> = aois
            .iter()
            .filter_map(|a| match a {
                Aoi::Polygon(p) => Some(p.clone()),
                Aoi::Point(_) => None,
            })
            .collect();
        if !self.config.unify_aois || polygons.len() < 2 {
            return Ok((aois.to_vec(), false));
        }

        let unified = normalizer.unify(&polygons)?;
        let degraded = unified.is_degraded();

        let mut prepared: Vec<Aoi> = aois.iter().filter(|a| a.kind() == AoiKind::Point).cloned().collect();
        prepared.push(Aoi::Polygon(unified.into_polygon()));
        Ok((prepared, degraded))
    }
}
