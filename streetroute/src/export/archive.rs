//! Zip archive assembly.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ExportError;

/// Prefix for image entries inside the archive.
pub const IMAGE_DIR: &str = "images";

/// In-memory zip writer.
///
/// JPEG entries are stored as-is; text entries are deflated.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    images: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            images: 0,
        }
    }

    /// Add an image as `images/<filename>`.
    pub fn add_image(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer
            .start_file(format!("{}/{}", IMAGE_DIR, filename), options)?;
        self.write(bytes)?;
        self.images += 1;
        Ok(())
    }

    /// Add a text file at the archive root.
    pub fn add_text(&mut self, name: &str, text: &str) -> Result<(), ExportError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(name, options)?;
        self.write(text.as_bytes())
    }

    pub fn image_count(&self) -> usize {
        self.images
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        Ok(self.writer.finish()?.into_inner())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ExportError> {
        self.writer
            .write_all(bytes)
            .map_err(|e| ExportError::ArchiveGenerationFailed(e.to_string()))
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
