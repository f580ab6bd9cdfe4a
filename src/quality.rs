use crate::scene::{first_ring, SceneBatch, SceneRef};

pub const DEFAULT_MIN_POINTS: usize = 5;
pub const DEFAULT_MIN_VIEW_ANGLE: f64 = 3.0;
pub const STANDARD_QUALITY: &str = "standard";

/// Drops scenes without ground control, non-standard quality, oblique views
/// or footprints with too few vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityFilter {
    pub min_points: usize,
    /// Scenes must be strictly below this off-nadir angle.
    pub min_view_angle: f64,
}

impl QualityFilter {
    pub fn new() -> Self {
        Self {
            min_points: DEFAULT_MIN_POINTS,
            min_view_angle: DEFAULT_MIN_VIEW_ANGLE,
        }
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_min_view_angle(mut self, min_view_angle: f64) -> Self {
        self.min_view_angle = min_view_angle;
        self
    }

    pub fn accepts(&self, scene: &SceneRef<'_>) -> bool {
        let props = scene.properties;
        props.ground_control
            && props.quality_category == STANDARD_QUALITY
            && props.view_angle < self.min_view_angle
            && first_ring(scene.geometry).map_or(0, <[_]>::len) >= self.min_points
    }

    /// Returns the passing scenes as a new batch, in their original order.
    pub fn apply(&self, batch: &SceneBatch) -> SceneBatch {
        let keep: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter(|(_, scene)| self.accepts(scene))
            .map(|(i, _)| i)
            .collect();

        log::info!("Quality filter kept {} of {} scene(s)", keep.len(), batch.len());
        batch.select(&keep)
    }
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new()
    }
}
