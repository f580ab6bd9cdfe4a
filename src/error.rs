use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlapError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("AOI file not found: {}", .0.display())]
    AoiNotFound(PathBuf),

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Start date {start} is after end date {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("Scene batch is misaligned: {properties} properties, {geometries} geometries, {ids} ids")]
    MisalignedBatch {
        properties: usize,
        geometries: usize,
        ids: usize,
    },

    #[error("Search failed after {attempts} attempt(s): {message}")]
    DispatchExhausted { attempts: u32, message: String },

    #[error("Search rejected: {0}")]
    DispatchFatal(String),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverlapError {
    /// True for the errors caused by bad caller input rather than the provider.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OverlapError::InvalidInput(_)
                | OverlapError::AoiNotFound(_)
                | OverlapError::InvalidDate { .. }
                | OverlapError::InvertedDateRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, OverlapError>;
