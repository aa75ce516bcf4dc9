//! Track document model and GPX parsing.
//!
//! [`parse_document`] turns GPX text into a [`RouteDocument`]: an ordered list
//! of non-empty tracks, optional waypoints, and pass-through metadata.

mod model;
mod parser;

pub use model::{DocumentMetadata, GeoPoint, RouteDocument, Track};
pub use parser::parse_document;

use thiserror::Error;

/// Errors produced while reading a track document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not well-formed XML or is not a GPX document.
    #[error("Malformed track document: {0}")]
    MalformedDocument(String),

    /// The document contains no track with at least one valid point.
    #[error("Track document contains no valid track points")]
    NoTracks,
}
