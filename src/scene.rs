//! Scene records as returned by the provider, and merging of per-request results.
//!
//! A [`SceneBatch`] keeps properties, geometries and ids as three parallel
//! sequences. Index `i` in each always describes the same scene; every
//! operation that drops scenes builds a new batch instead of editing in place.

use crate::error::{OverlapError, Result};
use chrono::{DateTime, Utc};
use geojson::feature::Id;
use geojson::{FeatureCollection, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// Provider metadata for one scene. Fields the pipeline does not interpret
/// are kept in `extra` so the raw record survives archival unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneProperties {
    pub acquired: DateTime<Utc>,
    pub cloud_cover: f64,
    pub sun_elevation: f64,
    #[serde(default)]
    pub view_angle: f64,
    pub instrument: String,
    pub satellite_id: String,
    #[serde(default)]
    pub ground_control: bool,
    #[serde(default)]
    pub quality_category: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl SceneProperties {
    /// Zenith angle of the sun: 90° minus its elevation.
    pub fn sun_angle(&self) -> f64 {
        90.0 - self.sun_elevation
    }
}

/// The exterior ring of a scene footprint as the provider sent it.
/// For multi-polygons this is the first member's exterior.
pub fn first_ring(geometry: &geojson::Geometry) -> Option<&[Vec<f64>]> {
    match &geometry.value {
        Value::Polygon(rings) => rings.first().map(Vec::as_slice),
        Value::MultiPolygon(polys) => polys.first()?.first().map(Vec::as_slice),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SceneRef<'a> {
    pub properties: &'a SceneProperties,
    pub geometry: &'a geojson::Geometry,
    pub id: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneBatch {
    properties: Vec<SceneProperties>,
    geometries: Vec<geojson::Geometry>,
    ids: Vec<String>,
}

impl SceneBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a batch from parallel sequences, which must have equal lengths.
    pub fn from_parts(
        properties: Vec<SceneProperties>,
        geometries: Vec<geojson::Geometry>,
        ids: Vec<String>,
    ) -> Result<Self> {
        if properties.len() != geometries.len() || properties.len() != ids.len() {
            return Err(OverlapError::MisalignedBatch {
                properties: properties.len(),
                geometries: geometries.len(),
                ids: ids.len(),
            });
        }
        Ok(Self {
            properties,
            geometries,
            ids,
        })
    }

    /// Parses a provider search page. Features without geometry are skipped.
    pub fn from_feature_collection(fc: FeatureCollection) -> Result<Self> {
        let mut batch = SceneBatch::new();
        for feature in fc.features {
            let id = match feature.id {
                Some(Id::String(s)) => s,
                Some(Id::Number(n)) => n.to_string(),
                None => String::new(),
            };
            let Some(geometry) = feature.geometry else {
                log::warn!("Skipping scene '{}' without geometry", id);
                continue;
            };
            let properties: SceneProperties =
                serde_json::from_value(JsonValue::Object(feature.properties.unwrap_or_default()))?;
            batch.push(properties, geometry, id);
        }
        Ok(batch)
    }

    pub fn push(&mut self, properties: SceneProperties, geometry: geojson::Geometry, id: String) {
        self.properties.push(properties);
        self.geometries.push(geometry);
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn properties(&self) -> &[SceneProperties] {
        &self.properties
    }

    pub fn geometries(&self) -> &[geojson::Geometry] {
        &self.geometries
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn get(&self, i: usize) -> Option<SceneRef<'_>> {
        Some(SceneRef {
            properties: self.properties.get(i)?,
            geometry: self.geometries.get(i)?,
            id: self.ids.get(i)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = SceneRef<'_>> {
        self.properties
            .iter()
            .zip(&self.geometries)
            .zip(&self.ids)
            .map(|((properties, geometry), id)| SceneRef {
                properties,
                geometry,
                id,
            })
    }

    /// New batch holding the scenes at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> SceneBatch {
        SceneBatch {
            properties: indices.iter().map(|&i| self.properties[i].clone()).collect(),
            geometries: indices.iter().map(|&i| self.geometries[i].clone()).collect(),
            ids: indices.iter().map(|&i| self.ids[i].clone()).collect(),
        }
    }

    /// Keeps the first occurrence of each id. The pipeline only calls this
    /// when explicitly configured to; raw per-tile duplicates are the default.
    pub fn dedup_by_id(&self) -> SceneBatch {
        let mut seen = HashSet::new();
        let keep: Vec<usize> = self
            .ids
            .iter()
            .enumerate()
            .filter(|(_, id)| seen.insert(id.as_str()))
            .map(|(i, _)| i)
            .collect();
        self.select(&keep)
    }

    pub fn into_parts(self) -> (Vec<SceneProperties>, Vec<geojson::Geometry>, Vec<String>) {
        (self.properties, self.geometries, self.ids)
    }
}

/// Concatenates per-tile, per-slice batches in the order they were dispatched.
///
/// No deduplication happens here: a scene straddling two tiles shows up once
/// per tile.
#[derive(Debug, Default)]
pub struct SceneMerger {
    merged: SceneBatch,
    batches: usize,
}

impl SceneMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, batch: SceneBatch) {
        let (properties, geometries, ids) = batch.into_parts();
        self.merged.properties.extend(properties);
        self.merged.geometries.extend(geometries);
        self.merged.ids.extend(ids);
        self.batches += 1;
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn finish(self) -> SceneBatch {
        self.merged
    }
}

pub fn merge_batches<I>(batches: I) -> SceneBatch
where
    I: IntoIterator<Item = SceneBatch>,
{
    let mut merger = SceneMerger::new();
    for batch in batches {
        merger.push(batch);
    }
    merger.finish()
}
