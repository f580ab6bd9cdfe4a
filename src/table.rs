//! The georeferenced result table, one row per retained scene.

use crate::overlap::OverlapAnalysis;
use crate::scene::SceneBatch;
use chrono::{DateTime, Utc};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use serde_json::{json, Map, Value as JsonValue};

/// Column order of the table. Kept even when the table is empty.
pub const COLUMNS: [&str; 13] = [
    "id",
    "name",
    "geometry",
    "view_angle",
    "acquired",
    "cloud_cover",
    "sun_elevation",
    "sun_angle",
    "satellite_id",
    "central_lon",
    "central_lat",
    "local_times",
    "max_sun_diff",
];

#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    /// Position in the filtered scene order.
    pub id: usize,
    /// Provider scene id.
    pub name: String,
    pub geometry: geojson::Geometry,
    pub view_angle: f64,
    pub acquired: DateTime<Utc>,
    pub cloud_cover: f64,
    pub sun_elevation: f64,
    pub sun_angle: f64,
    pub satellite_id: String,
    pub central_lon: f64,
    pub central_lat: f64,
    pub local_time: f64,
    pub max_sun_diff: f64,
}

impl ResultRow {
    fn properties(&self) -> Map<String, JsonValue> {
        let value = json!({
            "id": self.id,
            "name": self.name,
            "view_angle": self.view_angle,
            "acquired": self.acquired,
            "cloud_cover": self.cloud_cover,
            "sun_elevation": self.sun_elevation,
            "sun_angle": self.sun_angle,
            "satellite_id": self.satellite_id,
            "central_lon": self.central_lon,
            "central_lat": self.central_lat,
            "local_times": self.local_time,
            "max_sun_diff": self.max_sun_diff,
        });
        match value {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Aggregates logged after a run.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSummary {
    pub count: usize,
    pub first_acquired: Option<DateTime<Utc>>,
    pub last_acquired: Option<DateTime<Utc>>,
    pub mean_cloud_cover: Option<f64>,
    pub mean_sun_angle: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> TableSummary {
        let n = self.rows.len();
        let mean = |f: fn(&ResultRow) -> f64| {
            (n > 0).then(|| self.rows.iter().map(f).sum::<f64>() / n as f64)
        };
        TableSummary {
            count: n,
            first_acquired: self.rows.iter().map(|r| r.acquired).min(),
            last_acquired: self.rows.iter().map(|r| r.acquired).max(),
            mean_cloud_cover: mean(|r| r.cloud_cover),
            mean_sun_angle: mean(|r| r.sun_angle),
        }
    }

    pub fn log_summary(&self) {
        let s = self.summary();
        if s.count == 0 {
            log::info!("No scenes retained");
            return;
        }
        log::info!("Total scenes: {}", s.count);
        if let (Some(first), Some(last)) = (s.first_acquired, s.last_acquired) {
            log::info!("Date range: {} to {}", first, last);
        }
        if let Some(cloud) = s.mean_cloud_cover {
            log::info!("Average cloud cover: {:.3}", cloud);
        }
        if let Some(sun) = s.mean_sun_angle {
            log::info!("Average sun angle: {:.2}", sun);
        }
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .rows
            .iter()
            .map(|row| Feature {
                bbox: None,
                geometry: Some(row.geometry.clone()),
                id: Some(Id::String(row.name.clone())),
                properties: Some(row.properties()),
                foreign_members: None,
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

pub struct ResultTableBuilder;

impl ResultTableBuilder {
    /// Joins the filtered scenes with their derived columns. `analysis` must
    /// come from the same batch.
    pub fn build(batch: &SceneBatch, analysis: &OverlapAnalysis) -> ResultTable {
        if batch.is_empty() {
            return ResultTable::empty();
        }
        let max_sun_diffs = analysis.matrix.max_sun_diffs();
        let rows = batch
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                let p = scene.properties;
                ResultRow {
                    id: i,
                    name: scene.id.to_string(),
                    geometry: scene.geometry.clone(),
                    view_angle: p.view_angle,
                    acquired: p.acquired,
                    cloud_cover: p.cloud_cover,
                    sun_elevation: p.sun_elevation,
                    sun_angle: p.sun_angle(),
                    satellite_id: p.satellite_id.clone(),
                    central_lon: analysis.central_lon[i],
                    central_lat: analysis.central_lat[i],
                    local_time: analysis.local_times[i],
                    max_sun_diff: max_sun_diffs.get(i).copied().unwrap_or(0.0),
                }
            })
            .collect();
        ResultTable { rows }
    }
}
