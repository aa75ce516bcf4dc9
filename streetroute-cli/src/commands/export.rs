//! `streetroute export`: parse, sample, load every viewpoint, then package.

use clap::Args;
use console::style;
use tracing::info;

use streetroute::export::{format_distance, DirectorySink, ExportReport};
use streetroute::pipeline::{Pipeline, Progress, Stage};
use streetroute::resolver::LoadCounts;

use super::common::{
    apply_api_key, progress_bar, resolve_output_dir, resolve_sampling, route_name, FormatArg,
    ImageryArgs, RouteArgs,
};
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub route: RouteArgs,

    #[command(flatten)]
    pub imagery: ImageryArgs,

    /// Package as one archive or as individual files (default: export.format from config)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Leave metadata.json and route_info.txt out of the archive
    #[arg(long)]
    pub no_metadata: bool,

    /// JPEG quality 1-100; below 100 images are re-encoded (default: export.quality from config)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

pub fn run(args: ExportArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("export");

    let mut config = apply_api_key(runner.app_config()?, args.imagery.api_key);
    config.sampling = resolve_sampling(args.route.interval, &config)?;
    if let Some(format) = args.format {
        config.export.format = format.into();
    }
    if args.no_metadata {
        config.export.include_metadata = false;
    }
    if let Some(quality) = args.quality {
        config.export.quality = quality;
    }
    let output_dir = resolve_output_dir(
        args.imagery.output,
        runner.config().export.output_dir.as_deref(),
    );

    let text = runner.read_track(&args.route.gpx)?;
    let app = runner.start_app(config)?;

    let bar = progress_bar(0);
    let progress_target = bar.clone();
    let pipeline = Pipeline::new().with_progress(Box::new(move |p: &Progress| {
        report_progress(&progress_target, p)
    }));

    let route = pipeline.prepare(&text, app.config().sampling)?;
    let name = route_name(&route, &args.route.gpx);
    app.install_route(&route);

    let counts = runner.block_on(pipeline.load(app.resolver(), &app.config().render));
    bar.finish_and_clear();
    let counts = counts?;
    print_load_summary(&name, &counts);

    let sink = DirectorySink::new(&output_dir);
    let viewpoints = app.resolver().snapshot();
    let report = runner.block_on(app.exporter().export(
        &viewpoints,
        &app.config().export,
        &name,
        &sink,
    ))?;

    info!(
        exported = report.exported,
        failed = report.failed,
        output = %output_dir.display(),
        "Export written"
    );
    print_export_summary(&report, &output_dir.display().to_string(), route.sampled_length());
    Ok(())
}

fn report_progress(bar: &indicatif::ProgressBar, progress: &Progress) {
    match progress.stage {
        Stage::Parsing | Stage::Generating => bar.set_message(progress.message.clone()),
        Stage::Loading => {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.current as u64);
            bar.set_message(progress.message.clone());
        }
        Stage::Complete => {
            bar.set_position(progress.total as u64);
            bar.set_message(progress.message.clone());
        }
    }
}

fn print_load_summary(name: &str, counts: &LoadCounts) {
    let failed = if counts.failed > 0 {
        style(format!("{} failed", counts.failed)).yellow().to_string()
    } else {
        "0 failed".to_string()
    };
    println!(
        "{} {}: {} of {} viewpoints loaded, {}",
        style("✓").green(),
        style(name).bold(),
        counts.loaded,
        counts.total(),
        failed
    );
}

fn print_export_summary(report: &ExportReport, output_dir: &str, sampled_length: f64) {
    println!(
        "{} Exported {} images covering {} to {}",
        style("✓").green(),
        report.exported,
        format_distance(sampled_length),
        style(output_dir).cyan()
    );
    if report.failed > 0 {
        println!(
            "  {} {} images could not be fetched and were skipped",
            style("!").yellow(),
            report.failed
        );
    }
    for file in &report.files {
        println!("  {}", file);
    }
}
