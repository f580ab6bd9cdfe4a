pub mod aoi;
pub mod dates;
pub mod error;
pub mod overlap;
pub mod perf;
pub mod pipeline;
pub mod quality;
pub mod scene;
pub mod search;
pub mod table;
pub mod tiling;

pub use aoi::{Aoi, AoiKind, AoiSource, GeometryNormalizer};
pub use dates::DateRange;
pub use error::{OverlapError, Result};
pub use overlap::{BboxCheck, OverlapAnalyzer, OverlapMatrix};
pub use pipeline::{OverlapPipeline, PipelineConfig, PipelineOutput};
pub use quality::QualityFilter;
pub use scene::{SceneBatch, SceneMerger, SceneProperties};
pub use search::{RetryPolicy, RetryingSearch, SceneCatalog, SceneSearch, SearchError, SearchRequest};
pub use table::{ResultTable, ResultTableBuilder};
pub use tiling::{should_tile, SpatialTiler, TemporalTiler, TilingDecision};
