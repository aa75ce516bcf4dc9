//! In-memory track model produced by the parser.
//!
//! All types here are immutable once parsed; the parser is the only producer.

use chrono::{DateTime, Utc};

use crate::geo::Coordinates;

/// A single recorded position.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Elevation in meters, when the document carries one.
    pub elevation: Option<f64>,
    /// Recording instant, when the document carries one.
    pub timestamp: Option<DateTime<Utc>>,
}

impl GeoPoint {
    /// Create a point with only a position.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            elevation: None,
            timestamp: None,
        }
    }

    /// Attach an elevation in meters.
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Attach a recording instant.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The horizontal position of this point.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// One recorded path. Segments are concatenated in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Track {
    /// Track name from the document, if any.
    pub name: Option<String>,
    /// Ordered points of all segments.
    pub points: Vec<GeoPoint>,
}

/// Optional document-level metadata passed through from the source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.time.is_none()
    }
}

/// A parsed track document.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDocument {
    /// Tracks in document order. Never empty, and no track is empty.
    pub tracks: Vec<Track>,
    /// Standalone waypoints, possibly empty.
    pub waypoints: Vec<GeoPoint>,
    /// Document metadata, if the document declared any.
    pub metadata: Option<DocumentMetadata>,
}

impl RouteDocument {
    pub(crate) fn new(
        tracks: Vec<Track>,
        waypoints: Vec<GeoPoint>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            tracks,
            waypoints,
            metadata: (!metadata.is_empty()).then_some(metadata),
        }
    }

    /// All track points concatenated in track order.
    pub fn flatten(&self) -> Vec<GeoPoint> {
        self.tracks
            .iter()
            .flat_map(|track| track.points.iter().cloned())
            .collect()
    }

    /// Total number of track points across all tracks.
    pub fn point_count(&self) -> usize {
        self.tracks.iter().map(|t| t.points.len()).sum()
    }

    /// Best available display name: metadata name, then first named track.
    pub fn display_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .or_else(|| self.tracks.iter().find_map(|t| t.name.as_deref()))
    }
}
