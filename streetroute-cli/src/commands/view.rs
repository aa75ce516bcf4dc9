//! `streetroute view`: move the cursor to one viewpoint and save its image.
//!
//! The neighbors on either side are prefetched exactly as when stepping
//! through a route interactively; their outcome is reported once they settle.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use streetroute::export::{format_distance, image_filename};
use streetroute::pipeline::Pipeline;
use streetroute::resolver::PrefetchOutcome;
use streetroute::route::{LoadState, Viewpoint};

use super::common::{apply_api_key, resolve_output_dir, resolve_sampling, ImageryArgs, RouteArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub route: RouteArgs,

    #[command(flatten)]
    pub imagery: ImageryArgs,

    /// Viewpoint number as listed by `inspect` (starting at 1)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub index: u64,
}

pub fn run(args: ViewArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("view");

    let mut config = apply_api_key(runner.app_config()?, args.imagery.api_key);
    config.sampling = resolve_sampling(args.route.interval, &config)?;
    let output_dir = resolve_output_dir(
        args.imagery.output,
        runner.config().export.output_dir.as_deref(),
    );

    let text = runner.read_track(&args.route.gpx)?;
    let app = runner.start_app(config)?;
    let route = Pipeline::new().prepare(&text, app.config().sampling)?;
    app.install_route(&route);

    let cursor = (args.index - 1) as usize;
    let (current, prefetch) =
        runner.block_on(app.resolver().navigate(cursor, &app.config().render))?;

    print_viewpoint(&current, route.viewpoints().len());

    if let Some(resource) = current.resource() {
        let bytes = runner
            .block_on(app.resolver().source().fetch(&resource.url))
            .map_err(CliError::ImageFetch)?;
        let path = image_path(&output_dir, &current);
        save(&path, &bytes)?;
        println!("  Saved {}", style(path.display()).cyan());
    }

    for outcome in runner.block_on(prefetch.wait()) {
        println!("  {}", describe_outcome(outcome));
    }
    Ok(())
}

fn print_viewpoint(viewpoint: &Viewpoint, total: usize) {
    let coordinates = viewpoint.coordinates();
    let marker = match viewpoint.load_state() {
        LoadState::Loaded => style("✓").green(),
        _ => style("✗").red(),
    };
    println!(
        "{} Viewpoint {} of {} at {:.6}, {:.6} ({} from start) is {}",
        marker,
        viewpoint.id().0 + 1,
        total,
        coordinates.lat,
        coordinates.lon,
        format_distance(viewpoint.cumulative_distance()),
        viewpoint.load_state()
    );
    if let Some(error) = viewpoint.error() {
        println!("  {}", style(error).red());
    }
}

fn image_path(dir: &Path, viewpoint: &Viewpoint) -> PathBuf {
    dir.join(image_filename(
        viewpoint.id().0 + 1,
        viewpoint.cumulative_distance(),
    ))
}

fn save(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)
    };
    write().map_err(|error| CliError::FileWrite {
        path: path.to_path_buf(),
        error,
    })
}

fn describe_outcome(outcome: PrefetchOutcome) -> String {
    match outcome {
        PrefetchOutcome::Resolved { id, state } => {
            format!("Prefetched viewpoint {}: {}", id.0 + 1, state)
        }
        PrefetchOutcome::Skipped { id, state } => {
            format!("Viewpoint {} already {}", id.0 + 1, state)
        }
        PrefetchOutcome::Superseded { id } => {
            format!("Prefetch of viewpoint {} dropped, route changed", id.0 + 1)
        }
        PrefetchOutcome::Aborted => "Prefetch task aborted".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streetroute::route::ViewpointId;

    #[test]
    fn test_outcomes_use_one_based_numbers() {
        let text = describe_outcome(PrefetchOutcome::Resolved {
            id: ViewpointId(0),
            state: LoadState::Loaded,
        });
        assert_eq!(text, "Prefetched viewpoint 1: loaded");

        let text = describe_outcome(PrefetchOutcome::Skipped {
            id: ViewpointId(4),
            state: LoadState::Loading,
        });
        assert_eq!(text, "Viewpoint 5 already loading");
    }

    #[test]
    fn test_save_creates_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("views").join("001_0m.jpg");

        save(&path, b"jpeg").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");
    }
}
