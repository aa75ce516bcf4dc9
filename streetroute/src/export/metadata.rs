//! Machine-readable and tabular export summaries.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::naming::format_distance;
use crate::route::Viewpoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// One entry of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    /// Viewpoint index in the sampled sequence.
    pub index: usize,
    pub filename: String,
    pub coordinates: LatLng,
    pub heading: Option<f64>,
    /// Cumulative distance in meters.
    pub distance: f64,
    pub loaded: bool,
    pub error: Option<String>,
}

impl ImageRecord {
    pub fn new(viewpoint: &Viewpoint, filename: String) -> Self {
        let coordinates = viewpoint.coordinates();
        Self {
            index: viewpoint.id().0,
            filename,
            coordinates: LatLng {
                lat: coordinates.lat,
                lng: coordinates.lon,
            },
            heading: viewpoint.heading(),
            distance: viewpoint.cumulative_distance(),
            loaded: viewpoint.is_exportable(),
            error: viewpoint.error().map(ToString::to_string),
        }
    }
}

/// Pretty-printed JSON array of records.
pub fn metadata_json(records: &[ImageRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Human-readable summary table.
pub fn route_info(route_name: &str, records: &[ImageRecord], generated: DateTime<Utc>) -> String {
    let total = records.last().map(|r| r.distance).unwrap_or(0.0);

    let mut out = String::new();
    let _ = writeln!(out, "Route: {}", route_name);
    let _ = writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Images: {}", records.len());
    let _ = writeln!(out, "Distance covered: {}", format_distance(total));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<6} {:<20} {:>11} {:>12} {:>8} {:>10}",
        "Index", "File", "Latitude", "Longitude", "Heading", "Distance"
    );

    for record in records {
        let heading = record
            .heading
            .map(|h| format!("{:.1}", h))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<6} {:<20} {:>11.6} {:>12.6} {:>8} {:>10}",
            record.index,
            record.filename,
            record.coordinates.lat,
            record.coordinates.lng,
            heading,
            format_distance(record.distance)
        );
    }

    out
}
