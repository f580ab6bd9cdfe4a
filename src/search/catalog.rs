//! An in-memory provider answering searches from a local scene collection.

use super::{SceneSearch, SearchError, SearchRequest};
use crate::error::Result;
use crate::overlap::to_polygon;
use crate::scene::SceneBatch;
use geo::Intersects;
use geo_types::Polygon;
use geojson::FeatureCollection;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Applies the provider-side filters (footprint intersection, acquisition
/// day, cloud cover, sun elevation) to a fixed set of scenes.
pub struct SceneCatalog {
    scenes: SceneBatch,
    footprints: Vec<Polygon<f64>>,
    searches: usize,
}

impl SceneCatalog {
    pub fn new(scenes: SceneBatch) -> Self {
        let footprints = scenes.geometries().iter().map(to_polygon).collect();
        Self {
            scenes,
            footprints,
            searches: 0,
        }
    }

    /// Loads a FeatureCollection of provider scene features.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let fc: FeatureCollection = serde_json::from_reader(reader)?;
        Ok(Self::new(SceneBatch::from_feature_collection(fc)?))
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Number of searches answered so far.
    pub fn searches(&self) -> usize {
        self.searches
    }
}

impl SceneSearch for SceneCatalog {
    fn search(&mut self, request: &SearchRequest) -> std::result::Result<SceneBatch, SearchError> {
        self.searches += 1;
        let range = &request.date_range;

        let hits: Vec<usize> = self
            .scenes
            .iter()
            .zip(&self.footprints)
            .enumerate()
            .filter(|(_, (scene, footprint))| {
                let p = scene.properties;
                let day = p.acquired.date_naive();
                day >= range.start()
                    && day <= range.end()
                    && p.cloud_cover <= request.max_cloud
                    && p.sun_elevation >= request.min_sun_angle
                    && footprint.intersects(&request.geometry)
            })
            .map(|(i, _)| i)
            .collect();

        log::debug!("Catalog search {} matched {} scene(s)", range, hits.len());
        Ok(self.scenes.select(&hits))
    }
}
