//! Export error types.

use std::io;

use thiserror::Error;

/// Errors that abort an export attempt.
///
/// Per-image fetch failures are not errors; they are counted in the
/// [`ExportReport`](super::ExportReport).
#[derive(Debug, Error)]
pub enum ExportError {
    /// No viewpoint is loaded and error-free.
    #[error("No loaded viewpoints to export")]
    NothingToExport,

    /// Packaging produced no archive, e.g. because every image fetch failed.
    #[error("Failed to generate archive: {0}")]
    ArchiveGenerationFailed(String),

    /// The sink could not store an output file.
    #[error("Failed to write {name}: {source}")]
    Sink {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl From<zip::result::ZipError> for ExportError {
    fn from(e: zip::result::ZipError) -> Self {
        ExportError::ArchiveGenerationFailed(e.to_string())
    }
}
