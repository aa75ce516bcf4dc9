//! Arguments and helpers shared across commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use streetroute::app::AppConfig;
use streetroute::export::ExportFormat;
use streetroute::pipeline::PreparedRoute;
use streetroute::route::SamplingConfig;

use crate::error::CliError;

/// Track input shared by every route command.
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// GPX track file
    pub gpx: PathBuf,

    /// Spacing between viewpoints in meters (default: sampling.interval from config)
    #[arg(long)]
    pub interval: Option<f64>,
}

/// Imagery arguments shared by commands that fetch images.
#[derive(Debug, Args)]
pub struct ImageryArgs {
    /// Street-level imagery API key (default: imagery.api_key from config)
    #[arg(long, env = "STREETROUTE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output directory (default: export.output_dir from config, else current directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Export format selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum FormatArg {
    /// One zip archive with images and metadata
    Archive,
    /// One JPEG file per viewpoint
    Individual,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Archive => ExportFormat::Archive,
            FormatArg::Individual => ExportFormat::Individual,
        }
    }
}

/// Sampling config from `--interval`, falling back to the configured value.
pub fn resolve_sampling(
    cli_interval: Option<f64>,
    config: &AppConfig,
) -> Result<SamplingConfig, CliError> {
    match cli_interval {
        Some(interval) => {
            SamplingConfig::new(interval).map_err(|e| CliError::Config(e.to_string()))
        }
        None => Ok(config.sampling),
    }
}

/// Apply `--api-key` over the configured key.
pub fn apply_api_key(config: AppConfig, cli_key: Option<String>) -> AppConfig {
    match cli_key {
        Some(key) => config.with_credential(key),
        None => config,
    }
}

/// Output directory: CLI, then config, then the current directory.
pub fn resolve_output_dir(cli_output: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
    cli_output
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Display name for a route: the document's own name, else the file stem.
pub fn route_name(route: &PreparedRoute, path: &Path) -> String {
    route
        .name()
        .map(str::to_string)
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "route".to_string())
}

/// Progress bar for per-viewpoint work.
pub fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use streetroute::pipeline::Pipeline;

    const UNNAMED: &str = r#"<gpx><trk><trkseg>
        <trkpt lat="0" lon="0"/><trkpt lat="0" lon="0.001"/>
    </trkseg></trk></gpx>"#;

    #[test]
    fn test_cli_interval_overrides_config() {
        let config = AppConfig::default();
        assert_eq!(
            resolve_sampling(Some(10.0), &config).unwrap().interval_distance(),
            10.0
        );
        assert_eq!(
            resolve_sampling(None, &config).unwrap().interval_distance(),
            50.0
        );
        assert!(matches!(
            resolve_sampling(Some(0.0), &config),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_cli_api_key_overrides_config() {
        let config = AppConfig::default().with_credential("from-config");
        let config = apply_api_key(config, Some("from-cli".to_string()));
        assert_eq!(config.render.credential.as_deref(), Some("from-cli"));

        let config = apply_api_key(config, None);
        assert_eq!(config.render.credential.as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_output_dir_precedence() {
        let configured = PathBuf::from("/srv/exports");
        assert_eq!(
            resolve_output_dir(Some(PathBuf::from("out")), Some(&configured)),
            PathBuf::from("out")
        );
        assert_eq!(resolve_output_dir(None, Some(&configured)), configured);
        assert_eq!(resolve_output_dir(None, None), PathBuf::from("."));
    }

    #[test]
    fn test_route_name_falls_back_to_file_stem() {
        let route = Pipeline::new()
            .prepare(UNNAMED, SamplingConfig::default())
            .unwrap();
        assert_eq!(route_name(&route, Path::new("rides/coast road.gpx")), "coast road");
    }

    #[test]
    fn test_format_arg_conversion() {
        assert_eq!(ExportFormat::from(FormatArg::Archive), ExportFormat::Archive);
        assert_eq!(ExportFormat::from(FormatArg::Individual), ExportFormat::Individual);
    }
}
