//! Export pipeline.
//!
//! Packages loaded viewpoints into a zip archive or hands them over one file
//! at a time. Images are processed strictly in sequence order, one fetch at a
//! time. A failed image fetch is counted and skipped; only an archive with no
//! images at all is an error.
//!
//! # Archive layout
//!
//! ```text
//! <route>_streetview.zip
//! ├── images/001_0m.jpg
//! ├── images/002_50m.jpg
//! ├── ...
//! ├── metadata.json     (include_metadata)
//! └── route_info.txt    (include_metadata)
//! ```

mod archive;
mod encode;
mod error;
mod metadata;
mod naming;
mod options;
mod sink;

pub use archive::{ArchiveBuilder, IMAGE_DIR};
pub use encode::{apply_quality, reencode_jpeg};
pub use error::ExportError;
pub use metadata::{metadata_json, route_info, ImageRecord, LatLng};
pub use naming::{archive_filename, format_distance, image_filename, sanitize_name};
pub use options::{
    ExportFormat, ExportOptions, ExporterConfig, DEFAULT_DOWNLOAD_DELAY, MAX_QUALITY,
};
pub use sink::{DirectorySink, ExportSink};

#[cfg(test)]
pub use sink::tests::MemorySink;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::CachedImageSource;
use crate::provider::ImageryProvider;
use crate::route::Viewpoint;

/// Name of the machine-readable summary inside an archive.
pub const METADATA_FILE: &str = "metadata.json";

/// Name of the tabular summary inside an archive.
pub const ROUTE_INFO_FILE: &str = "route_info.txt";

/// Outcome of a completed export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Images written.
    pub exported: usize,
    /// Images skipped because their fetch failed.
    pub failed: usize,
    /// Names handed to the sink, in order.
    pub files: Vec<String>,
}

/// Packages loaded viewpoints.
pub struct Exporter<P> {
    source: CachedImageSource<P>,
    config: ExporterConfig,
}

impl<P> Clone for Exporter<P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P: ImageryProvider> Exporter<P> {
    pub fn new(source: CachedImageSource<P>, config: ExporterConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Export every loaded, error-free viewpoint of `viewpoints`.
    ///
    /// # Errors
    ///
    /// - [`ExportError::NothingToExport`] if no viewpoint qualifies; the sink
    ///   is not called
    /// - [`ExportError::ArchiveGenerationFailed`] if no image could be packaged
    /// - [`ExportError::Sink`] if the sink rejects a file
    pub async fn export<S: ExportSink>(
        &self,
        viewpoints: &[Viewpoint],
        options: &ExportOptions,
        route_name: &str,
        sink: &S,
    ) -> Result<ExportReport, ExportError> {
        let loaded: Vec<&Viewpoint> = viewpoints.iter().filter(|v| v.is_exportable()).collect();
        if loaded.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        info!(
            route = route_name,
            format = %options.format,
            images = loaded.len(),
            quality = options.quality,
            "Starting export"
        );

        let report = match options.format {
            ExportFormat::Archive => self.export_archive(&loaded, options, route_name, sink).await?,
            ExportFormat::Individual => self.export_individual(&loaded, options, sink).await?,
        };

        info!(
            exported = report.exported,
            failed = report.failed,
            "Export complete"
        );
        Ok(report)
    }

    async fn export_archive<S: ExportSink>(
        &self,
        loaded: &[&Viewpoint],
        options: &ExportOptions,
        route_name: &str,
        sink: &S,
    ) -> Result<ExportReport, ExportError> {
        let mut builder = ArchiveBuilder::new();
        let mut records = Vec::with_capacity(loaded.len());
        let mut failed = 0;

        for viewpoint in loaded {
            let Some(bytes) = self.image_bytes(viewpoint, options.quality).await else {
                failed += 1;
                continue;
            };

            let filename = image_filename(builder.image_count() + 1, viewpoint.cumulative_distance());
            builder.add_image(&filename, &bytes)?;
            records.push(ImageRecord::new(viewpoint, filename));
        }

        if builder.image_count() == 0 {
            return Err(ExportError::ArchiveGenerationFailed(format!(
                "none of {} images could be fetched",
                loaded.len()
            )));
        }

        if options.include_metadata {
            let json = metadata_json(&records)
                .map_err(|e| ExportError::ArchiveGenerationFailed(e.to_string()))?;
            builder.add_text(METADATA_FILE, &json)?;
            builder.add_text(ROUTE_INFO_FILE, &route_info(route_name, &records, Utc::now()))?;
        }

        let exported = builder.image_count();
        let archive = builder.finish()?;
        let name = archive_filename(route_name);
        sink.save(&name, &archive)
            .await
            .map_err(|source| ExportError::Sink {
                name: name.clone(),
                source,
            })?;
        debug!(archive = %name, bytes = archive.len(), "Archive handed to sink");

        Ok(ExportReport {
            exported,
            failed,
            files: vec![name],
        })
    }

    async fn export_individual<S: ExportSink>(
        &self,
        loaded: &[&Viewpoint],
        options: &ExportOptions,
        sink: &S,
    ) -> Result<ExportReport, ExportError> {
        let mut report = ExportReport::default();

        for (position, viewpoint) in loaded.iter().enumerate() {
            if position > 0 && !self.config.download_delay.is_zero() {
                tokio::time::sleep(self.config.download_delay).await;
            }

            let Some(bytes) = self.image_bytes(viewpoint, options.quality).await else {
                report.failed += 1;
                continue;
            };

            let name = image_filename(report.exported + 1, viewpoint.cumulative_distance());
            sink.save(&name, &bytes)
                .await
                .map_err(|source| ExportError::Sink {
                    name: name.clone(),
                    source,
                })?;
            report.exported += 1;
            report.files.push(name);
        }

        if report.exported == 0 {
            warn!(failed = report.failed, "Individual export wrote no files");
        }
        Ok(report)
    }

    /// Fetch a viewpoint's image, adjusted to `quality`. `None` on failure.
    async fn image_bytes(&self, viewpoint: &Viewpoint, quality: u8) -> Option<Bytes> {
        let resource = viewpoint.resource()?;
        match self.source.fetch(&resource.url).await {
            Ok(bytes) => Some(apply_quality(bytes, quality).await),
            Err(e) => {
                warn!(id = %viewpoint.id(), error = %e, "Skipping image in export");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::time::Duration;

    use crate::cache::ImageCache;
    use crate::geo::Coordinates;
    use crate::provider::{MockAsyncHttpClient, StreetViewProvider};
    use crate::resolver::ResolutionError;
    use crate::route::{ResourceHandle, ViewpointId};

    type TestExporter = Exporter<StreetViewProvider<MockAsyncHttpClient>>;

    fn url(index: usize) -> String {
        format!("http://example.test/img/{}", index)
    }

    fn viewpoint(index: usize, outcome: Option<Result<(), ()>>) -> Viewpoint {
        let mut vp = Viewpoint::new(
            ViewpointId(index),
            Coordinates::new(53.5, 9.9 + index as f64 * 0.001),
            Some(90.0),
            index as f64 * 50.0,
        );
        if let Some(outcome) = outcome {
            vp.begin_loading();
            vp.finish(
                outcome
                    .map(|_| ResourceHandle {
                        url: url(index),
                        size_bytes: 4,
                    })
                    .map_err(|_| ResolutionError::FetchFailed),
            );
        }
        vp
    }

    fn loaded(index: usize) -> Viewpoint {
        viewpoint(index, Some(Ok(())))
    }

    fn exporter(client: MockAsyncHttpClient) -> (TestExporter, ImageCache) {
        let cache = ImageCache::new(1_000_000);
        let source = CachedImageSource::new(StreetViewProvider::new(client), cache.clone());
        let exporter = Exporter::new(
            source,
            ExporterConfig {
                download_delay: Duration::ZERO,
            },
        );
        (exporter, cache)
    }

    fn open(bytes: &[u8]) -> zip::ZipArchive<Cursor<Vec<u8>>> {
        zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap()
    }

    #[tokio::test]
    async fn test_nothing_to_export() {
        let (exporter, _) = exporter(MockAsyncHttpClient::ok(b"jpeg"));
        let sink = MemorySink::default();
        let viewpoints = vec![viewpoint(0, None), viewpoint(1, Some(Err(())))];

        let result = exporter
            .export(&viewpoints, &ExportOptions::default(), "Route", &sink)
            .await;

        assert!(matches!(result, Err(ExportError::NothingToExport)));
        assert!(sink.files().is_empty());
    }

    #[tokio::test]
    async fn test_archive_with_metadata() {
        let (exporter, _) = exporter(MockAsyncHttpClient::ok(b"jpeg"));
        let sink = MemorySink::default();
        let viewpoints = vec![
            loaded(0),
            viewpoint(1, None),
            loaded(2),
            viewpoint(3, Some(Err(()))),
            loaded(4),
        ];

        let report = exporter
            .export(&viewpoints, &ExportOptions::default(), "Harbour loop", &sink)
            .await
            .unwrap();

        assert_eq!(report.exported, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(report.files, vec!["Harbour_loop_streetview.zip".to_string()]);

        let files = sink.files();
        assert_eq!(files.len(), 1);
        let mut archive = open(&files[0].1);
        assert_eq!(archive.len(), 5);
        assert!(archive.by_name("images/001_0m.jpg").is_ok());
        assert!(archive.by_name("images/002_100m.jpg").is_ok());
        assert!(archive.by_name("images/003_200m.jpg").is_ok());
        assert!(archive.by_name(ROUTE_INFO_FILE).is_ok());

        let mut json = String::new();
        archive
            .by_name(METADATA_FILE)
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        let records: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = records.as_array().unwrap();
        assert_eq!(records.len(), 3);
        let indices: Vec<u64> = records.iter().map(|r| r["index"].as_u64().unwrap()).collect();
        assert_eq!(indices, vec![0, 2, 4]);
        assert!(records.iter().all(|r| r["loaded"] == true));
    }

    #[tokio::test]
    async fn test_archive_without_metadata() {
        let (exporter, _) = exporter(MockAsyncHttpClient::ok(b"jpeg"));
        let sink = MemorySink::default();
        let options = ExportOptions {
            include_metadata: false,
            ..Default::default()
        };

        exporter
            .export(&[loaded(0), loaded(1)], &options, "r", &sink)
            .await
            .unwrap();

        let archive = open(&sink.files()[0].1);
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.starts_with("images/")));
    }

    #[tokio::test]
    async fn test_archive_skips_failed_fetches() {
        let (exporter, cache) = exporter(MockAsyncHttpClient::failing("HTTP 500"));
        cache.insert(&url(1), Bytes::from_static(b"cached")).await;
        let sink = MemorySink::default();

        let report = exporter
            .export(
                &[loaded(0), loaded(1), loaded(2)],
                &ExportOptions::default(),
                "r",
                &sink,
            )
            .await
            .unwrap();

        assert_eq!(report.exported, 1);
        assert_eq!(report.failed, 2);
        let mut archive = open(&sink.files()[0].1);
        assert!(archive.by_name("images/001_50m.jpg").is_ok());
    }

    #[tokio::test]
    async fn test_archive_fails_when_nothing_packaged() {
        let (exporter, _) = exporter(MockAsyncHttpClient::failing("HTTP 500"));
        let sink = MemorySink::default();

        let result = exporter
            .export(&[loaded(0), loaded(1)], &ExportOptions::default(), "r", &sink)
            .await;

        assert!(matches!(result, Err(ExportError::ArchiveGenerationFailed(_))));
        assert!(sink.files().is_empty());
    }

    #[tokio::test]
    async fn test_individual_files_in_order() {
        let client = MockAsyncHttpClient::ok(b"jpeg");
        let (exporter, _) = exporter(client.clone());
        let sink = MemorySink::default();
        let options = ExportOptions {
            format: ExportFormat::Individual,
            ..Default::default()
        };

        let report = exporter
            .export(&[loaded(0), viewpoint(1, None), loaded(2)], &options, "r", &sink)
            .await
            .unwrap();

        assert_eq!(report.exported, 2);
        assert_eq!(sink.names(), vec!["001_0m.jpg", "002_100m.jpg"]);
        assert_eq!(report.files, sink.names());
        assert_eq!(client.urls(), vec![url(0), url(2)]);
    }

    #[tokio::test]
    async fn test_individual_counts_failures() {
        let (exporter, cache) = exporter(MockAsyncHttpClient::failing("HTTP 404"));
        cache.insert(&url(2), Bytes::from_static(b"cached")).await;
        let sink = MemorySink::default();
        let options = ExportOptions {
            format: ExportFormat::Individual,
            ..Default::default()
        };

        let report = exporter
            .export(&[loaded(0), loaded(2)], &options, "r", &sink)
            .await
            .unwrap();

        assert_eq!(report.exported, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(sink.names(), vec!["001_100m.jpg"]);
    }

    #[tokio::test]
    async fn test_individual_with_every_fetch_failing() {
        let (exporter, _) = exporter(MockAsyncHttpClient::failing("HTTP 500"));
        let sink = MemorySink::default();
        let options = ExportOptions {
            format: ExportFormat::Individual,
            ..Default::default()
        };

        let report = exporter
            .export(&[loaded(0), loaded(1)], &options, "r", &sink)
            .await
            .unwrap();

        assert_eq!(report.exported, 0);
        assert_eq!(report.failed, 2);
        assert!(report.files.is_empty());
        assert!(sink.files().is_empty());
    }

    #[tokio::test]
    async fn test_export_uses_cached_bytes() {
        let client = MockAsyncHttpClient::ok(b"fresh");
        let (exporter, cache) = exporter(client.clone());
        cache.insert(&url(0), Bytes::from_static(b"cached")).await;
        let sink = MemorySink::default();
        let options = ExportOptions {
            format: ExportFormat::Individual,
            ..Default::default()
        };

        exporter.export(&[loaded(0)], &options, "r", &sink).await.unwrap();

        assert_eq!(client.call_count(), 0);
        assert_eq!(sink.files()[0].1, b"cached".to_vec());
    }
}
