//! Provider search filter documents.
//!
//! Filters nest: an `AndFilter` over the geometry, the acquisition window and
//! the cloud/sun limits. Several AOIs or date ranges combine under an
//! `OrFilter`.

use super::{validate_max_cloud, SearchRequest};
use crate::dates::DateRange;
use crate::error::Result;
use geo_types::Polygon;
use serde_json::{json, Value as JsonValue};

pub const DEFAULT_ITEM_TYPE: &str = "PSScene";

pub fn geometry_filter(aoi: &Polygon<f64>) -> Result<JsonValue> {
    let geometry = geojson::Geometry::new(geojson::Value::from(aoi));
    Ok(json!({
        "type": "GeometryFilter",
        "field_name": "geometry",
        "config": serde_json::to_value(geometry)?,
    }))
}

/// Whole-day window on `acquired`, from the first to the last millisecond.
pub fn date_range_filter(range: &DateRange) -> JsonValue {
    json!({
        "type": "DateRangeFilter",
        "field_name": "acquired",
        "config": {
            "gte": format!("{}T00:00:00.000Z", range.start().format("%Y-%m-%d")),
            "lte": format!("{}T23:59:59.999Z", range.end().format("%Y-%m-%d")),
        },
    })
}

pub fn cloud_cover_filter(max_cloud: f64) -> JsonValue {
    json!({
        "type": "RangeFilter",
        "field_name": "cloud_cover",
        "config": { "lte": max_cloud },
    })
}

pub fn sun_angle_filter(min_sun_angle: f64) -> JsonValue {
    json!({
        "type": "RangeFilter",
        "field_name": "sun_elevation",
        "config": { "gte": min_sun_angle },
    })
}

fn any_of(mut filters: Vec<JsonValue>) -> JsonValue {
    if filters.len() == 1 {
        filters.remove(0)
    } else {
        json!({ "type": "OrFilter", "config": filters })
    }
}

/// Combined filter for several AOIs and date ranges.
pub fn build_filters(
    aois: &[Polygon<f64>],
    date_ranges: &[DateRange],
    max_cloud: f64,
    min_sun_angle: f64,
) -> Result<JsonValue> {
    validate_max_cloud(max_cloud)?;

    let geometry = any_of(aois.iter().map(geometry_filter).collect::<Result<Vec<_>>>()?);
    let dates = any_of(date_ranges.iter().map(date_range_filter).collect());

    Ok(json!({
        "type": "AndFilter",
        "config": [
            geometry,
            dates,
            cloud_cover_filter(max_cloud),
            sun_angle_filter(min_sun_angle),
        ],
    }))
}

impl SearchRequest {
    pub fn filter(&self) -> Result<JsonValue> {
        build_filters(
            std::slice::from_ref(&self.geometry),
            std::slice::from_ref(&self.date_range),
            self.max_cloud,
            self.min_sun_angle,
        )
    }

    /// Body of a quick-search POST.
    pub fn search_body(&self, item_types: &[&str]) -> Result<JsonValue> {
        Ok(json!({
            "item_types": item_types,
            "filter": self.filter()?,
        }))
    }
}
