//! The boundary to the imagery provider.
//!
//! The pipeline talks to the provider only through [`SceneSearch`]. Each call
//! made by the pipeline is wrapped in its own [`RetryingSearch`] budget.

pub mod catalog;
pub mod filter;

pub use catalog::SceneCatalog;

use crate::dates::DateRange;
use crate::error::{OverlapError, Result};
use crate::scene::SceneBatch;
use geo_types::Polygon;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Network or HTTP failure worth retrying.
    #[error("transient search failure: {0}")]
    Transient(String),

    #[error("search failed: {0}")]
    Fatal(String),
}

/// One provider query: a tile, a date slice and the provider-side quality limits.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub geometry: Polygon<f64>,
    pub date_range: DateRange,
    pub max_cloud: f64,
    pub min_sun_angle: f64,
}

impl SearchRequest {
    pub fn new(geometry: Polygon<f64>, date_range: DateRange, max_cloud: f64, min_sun_angle: f64) -> Result<Self> {
        validate_max_cloud(max_cloud)?;
        Ok(Self {
            geometry,
            date_range,
            max_cloud,
            min_sun_angle,
        })
    }
}

pub fn validate_max_cloud(max_cloud: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&max_cloud) {
        return Err(OverlapError::InvalidInput(format!(
            "max_cloud must be between 0 and 1, got {}",
            max_cloud
        )));
    }
    Ok(())
}

/// A provider search. Returned batches are co-indexed and may be empty.
pub trait SceneSearch {
    fn search(&mut self, request: &SearchRequest) -> std::result::Result<SceneBatch, SearchError>;
}

impl<S: SceneSearch + ?Sized> SceneSearch for &mut S {
    fn search(&mut self, request: &SearchRequest) -> std::result::Result<SceneBatch, SearchError> {
        (**self).search(request)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait after the first failure; doubles after each further failure.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Runs each request with a fresh retry budget. Transient failures back off
/// exponentially; fatal ones and an exhausted budget end the run.
pub struct RetryingSearch<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: SceneSearch> RetryingSearch<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn dispatch(&mut self, request: &SearchRequest) -> Result<SceneBatch> {
        let mut attempt = 1;
        loop {
            match self.inner.search(request) {
                Ok(batch) => return Ok(batch),
                Err(SearchError::Fatal(message)) => return Err(OverlapError::DispatchFatal(message)),
                Err(SearchError::Transient(message)) => {
                    log::warn!("Attempt {} failed: {}", attempt, message);
                    if attempt >= self.policy.max_attempts {
                        return Err(OverlapError::DispatchExhausted {
                            attempts: attempt,
                            message,
                        });
                    }
                    let delay = self.policy.delay_after(attempt);
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}
