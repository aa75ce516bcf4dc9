//! GPX document parsing.
//!
//! The reader walks the XML event stream once and builds a [`RouteDocument`].
//! It is deliberately lenient about individual points: a point whose latitude
//! or longitude is missing or non-numeric is dropped from its track instead of
//! failing the whole document, and a track left without points is omitted.
//! Only structural problems (ill-formed XML, wrong root element) and a document
//! without any usable track point are errors.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use xml::attribute::OwnedAttribute;
use xml::reader::{ParserConfig, XmlEvent};

use super::model::{DocumentMetadata, GeoPoint, RouteDocument, Track};
use super::ParseError;

/// Local name of the root element of a track document.
const ROOT_ELEMENT: &str = "gpx";

/// Parse a GPX document from text.
///
/// # Errors
///
/// - [`ParseError::MalformedDocument`] if the text is not well-formed XML or
///   the root element is not `gpx`.
/// - [`ParseError::NoTracks`] if no track point survives filtering.
pub fn parse_document(text: &str) -> Result<RouteDocument, ParseError> {
    let reader = ParserConfig::new()
        .trim_whitespace(true)
        .cdata_to_characters(true)
        .create_reader(text.as_bytes());

    let mut builder = DocumentBuilder::default();

    for event in reader {
        match event {
            Ok(XmlEvent::StartElement {
                name, attributes, ..
            }) => builder.start(&name.local_name, &attributes)?,
            Ok(XmlEvent::EndElement { name }) => builder.end(&name.local_name),
            Ok(XmlEvent::Characters(chunk)) => builder.text.push_str(&chunk),
            Ok(_) => {}
            Err(e) => return Err(ParseError::MalformedDocument(e.to_string())),
        }
    }

    builder.finish()
}

/// Which list a point under construction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointKind {
    Track,
    Waypoint,
}

/// A point whose children have not all been read yet.
#[derive(Debug)]
struct PointDraft {
    kind: PointKind,
    lat: Option<f64>,
    lon: Option<f64>,
    elevation: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
}

impl PointDraft {
    fn from_attributes(kind: PointKind, attributes: &[OwnedAttribute]) -> Self {
        let attribute = |wanted: &str| {
            attributes
                .iter()
                .find(|a| a.name.local_name == wanted)
                .and_then(|a| parse_coordinate(&a.value))
        };

        Self {
            kind,
            lat: attribute("lat"),
            lon: attribute("lon"),
            elevation: None,
            timestamp: None,
        }
    }

    fn build(self) -> Option<GeoPoint> {
        Some(GeoPoint {
            lat: self.lat?,
            lon: self.lon?,
            elevation: self.elevation,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Default)]
struct DocumentBuilder {
    /// Names of the currently open elements, outermost first.
    path: Vec<String>,
    /// Character data of the innermost open element.
    text: String,
    seen_root: bool,
    tracks: Vec<Track>,
    current_track: Option<Track>,
    point: Option<PointDraft>,
    waypoints: Vec<GeoPoint>,
    metadata: DocumentMetadata,
    dropped_points: usize,
    dropped_tracks: usize,
}

impl DocumentBuilder {
    fn start(&mut self, name: &str, attributes: &[OwnedAttribute]) -> Result<(), ParseError> {
        if !self.seen_root {
            if name != ROOT_ELEMENT {
                return Err(ParseError::MalformedDocument(format!(
                    "root element is <{}>, expected <{}>",
                    name, ROOT_ELEMENT
                )));
            }
            self.seen_root = true;
        }

        match name {
            "trk" => self.current_track = Some(Track::default()),
            "trkpt" if self.current_track.is_some() => {
                self.point = Some(PointDraft::from_attributes(PointKind::Track, attributes));
            }
            "wpt" => {
                self.point = Some(PointDraft::from_attributes(PointKind::Waypoint, attributes));
            }
            _ => {}
        }

        self.path.push(name.to_string());
        self.text.clear();
        Ok(())
    }

    fn end(&mut self, name: &str) {
        self.path.pop();
        let parent = self.path.last().cloned();
        let text = std::mem::take(&mut self.text);
        let text = text.trim();

        match (name, parent.as_deref()) {
            ("ele", Some("trkpt" | "wpt")) => {
                if let Some(point) = self.point.as_mut() {
                    point.elevation = text.parse().ok().filter(|v: &f64| v.is_finite());
                }
            }
            ("time", Some("trkpt" | "wpt")) => {
                if let Some(point) = self.point.as_mut() {
                    point.timestamp = parse_time(text);
                }
            }
            ("time", Some("metadata" | ROOT_ELEMENT)) => self.metadata.time = parse_time(text),
            ("name", Some("trk")) => {
                if let Some(track) = self.current_track.as_mut() {
                    track.name = non_empty(text);
                }
            }
            ("name", Some("metadata" | ROOT_ELEMENT)) => self.metadata.name = non_empty(text),
            ("desc", Some("metadata" | ROOT_ELEMENT)) => {
                self.metadata.description = non_empty(text);
            }
            ("trkpt" | "wpt", _) => self.finish_point(),
            ("trk", _) => self.finish_track(),
            _ => {}
        }
    }

    fn finish_point(&mut self) {
        let Some(draft) = self.point.take() else {
            return;
        };
        let kind = draft.kind;

        match draft.build() {
            Some(point) => match kind {
                PointKind::Track => {
                    if let Some(track) = self.current_track.as_mut() {
                        track.points.push(point);
                    }
                }
                PointKind::Waypoint => self.waypoints.push(point),
            },
            None => {
                trace!(?kind, "Dropping point with unparsable coordinates");
                self.dropped_points += 1;
            }
        }
    }

    fn finish_track(&mut self) {
        let Some(track) = self.current_track.take() else {
            return;
        };

        if track.points.is_empty() {
            debug!(name = ?track.name, "Omitting track without valid points");
            self.dropped_tracks += 1;
        } else {
            self.tracks.push(track);
        }
    }

    fn finish(self) -> Result<RouteDocument, ParseError> {
        if !self.seen_root {
            return Err(ParseError::MalformedDocument(
                "no root element found".to_string(),
            ));
        }

        if self.dropped_points > 0 || self.dropped_tracks > 0 {
            debug!(
                dropped_points = self.dropped_points,
                dropped_tracks = self.dropped_tracks,
                "Filtered invalid track data"
            );
        }

        if self.tracks.is_empty() {
            return Err(ParseError::NoTracks);
        }

        let document = RouteDocument::new(self.tracks, self.waypoints, self.metadata);
        debug!(
            tracks = document.tracks.len(),
            points = document.point_count(),
            waypoints = document.waypoints.len(),
            "Parsed track document"
        );
        Ok(document)
    }
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
