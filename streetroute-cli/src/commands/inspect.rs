//! `streetroute inspect`: parse and sample a track without fetching images.

use console::style;

use streetroute::export::format_distance;
use streetroute::pipeline::{Pipeline, PreparedRoute};
use streetroute::route::Viewpoint;

use super::common::{resolve_sampling, route_name, RouteArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

pub fn run(args: RouteArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("inspect");

    let sampling = resolve_sampling(args.interval, &runner.app_config()?)?;
    let text = runner.read_track(&args.gpx)?;
    let route = Pipeline::new().prepare(&text, sampling)?;

    print_summary(&route, &route_name(&route, &args.gpx));
    println!();
    print_viewpoints(route.viewpoints());
    Ok(())
}

fn print_summary(route: &PreparedRoute, name: &str) {
    println!("{}", style(name).bold());
    println!(
        "  Tracks:      {} ({} points, {} waypoints)",
        route.document.tracks.len(),
        route.document.point_count(),
        route.document.waypoints.len()
    );
    println!("  Track length:   {}", format_distance(route.track_length()));
    println!("  Sampled length: {}", format_distance(route.sampled_length()));
    println!(
        "  Viewpoints:  {} every {}",
        route.viewpoints().len(),
        format_distance(route.config().interval_distance())
    );
}

fn print_viewpoints(viewpoints: &[Viewpoint]) {
    println!(
        "{}",
        style(format!(
            "{:>5}  {:>11}  {:>12}  {:>8}  {:>9}",
            "#", "Latitude", "Longitude", "Heading", "Distance"
        ))
        .underlined()
    );

    for viewpoint in viewpoints {
        println!("{}", viewpoint_row(viewpoint));
    }
}

fn viewpoint_row(viewpoint: &Viewpoint) -> String {
    let coordinates = viewpoint.coordinates();
    let heading = viewpoint
        .heading()
        .map(|h| format!("{:.1}°", h))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:>5}  {:>11.6}  {:>12.6}  {:>8}  {:>9}",
        viewpoint.id().0 + 1,
        coordinates.lat,
        coordinates.lon,
        heading,
        format_distance(viewpoint.cumulative_distance())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use streetroute::route::SamplingConfig;

    #[test]
    fn test_last_row_has_no_heading() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="0" lon="0"/><trkpt lat="0" lon="0.001"/>
        </trkseg></trk></gpx>"#;
        let route = Pipeline::new().prepare(gpx, SamplingConfig::default()).unwrap();
        let rows: Vec<String> = route.viewpoints().iter().map(viewpoint_row).collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("90.0°"));
        assert!(rows[0].trim_end().ends_with("0m"));
        assert!(rows[1].contains(" - "));
        assert!(rows[1].trim_end().ends_with("111m"));
    }
}
