//! Export destinations.
//!
//! The sink stands in for the host's download manager: the exporter hands it
//! finished files by name and never touches the filesystem itself.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Receives finished export files.
pub trait ExportSink: Send + Sync {
    /// Store one file.
    fn save(&self, name: &str, bytes: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// Writes export files into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    async fn save(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.dir.join(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Export file written");
        Ok(())
    }
}
