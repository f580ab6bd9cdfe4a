//! Runs the overlap pipeline against a local scene catalog.
//!
//! ```text
//! cargo run --example overlap -- --scenes scenes.geojson \
//!     --aoi aoi.geojson --aoi -122.4,37.7 --dates 2023-06-01:2023-08-31
//! ```

use clap::Parser;
use planet_overlap::perf::ScopedTimer;
use planet_overlap::{
    AoiSource, BboxCheck, DateRange, GeometryNormalizer, OverlapPipeline, PipelineConfig, QualityFilter,
    SceneCatalog,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = "pairwise overlap and sun-angle analysis of satellite scenes")]
struct Args {
    /// GeoJSON file or "lon,lat" point. Repeatable.
    #[arg(long, required = true, num_args = 1..)]
    aoi: Vec<AoiSource>,

    /// YYYY-MM-DD or YYYY-MM-DD:YYYY-MM-DD. Repeatable.
    #[arg(long, required = true, num_args = 1..)]
    dates: Vec<DateRange>,

    /// FeatureCollection of provider scenes to search.
    #[arg(long)]
    scenes: PathBuf,

    #[arg(long, default_value_t = 0.5)]
    max_cloud: f64,

    #[arg(long, default_value_t = 0.0)]
    min_sun_angle: f64,

    #[arg(long, default_value_t = 1.0)]
    tile_size: f64,

    #[arg(long, default_value_t = 3.0)]
    max_view_angle: f64,

    /// Use the full bbox overlap test before exact intersection.
    #[arg(long)]
    symmetric_bbox: bool,

    #[arg(long)]
    dedup: bool,

    #[arg(long)]
    unify: bool,

    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let aois = GeometryNormalizer::new().load(&args.aoi)?;
    let config = PipelineConfig::new()
        .with_max_cloud(args.max_cloud)
        .with_min_sun_angle(args.min_sun_angle)
        .with_tile_size(args.tile_size)
        .with_quality(QualityFilter::new().with_min_view_angle(args.max_view_angle))
        .with_bbox_check(if args.symmetric_bbox {
            BboxCheck::Symmetric
        } else {
            BboxCheck::OneSided
        })
        .with_dedup(args.dedup)
        .with_unified_aois(args.unify);

    let mut catalog = SceneCatalog::from_path(&args.scenes)?;
    let timer = ScopedTimer::new("overlap pipeline");
    let output = OverlapPipeline::new(config).run(&mut catalog, &aois, &args.dates)?;
    timer.finish();

    fs::create_dir_all(&args.output_dir)?;
    let results = args.output_dir.join("results.geojson");
    fs::write(&results, serde_json::to_string(&output.table.to_feature_collection())?)?;
    let properties = args.output_dir.join("properties.json");
    fs::write(&properties, serde_json::to_string_pretty(&output.raw_properties_json()?)?)?;

    println!(
        "{} scene(s) from {} request(s) written to {}",
        output.table.len(),
        output.requests,
        args.output_dir.display()
    );
    Ok(())
}
