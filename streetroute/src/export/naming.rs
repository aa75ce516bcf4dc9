//! Output file naming.

/// Format a route distance: whole meters below 1 km, else kilometers with
/// one decimal (`850m`, `1.2km`).
pub fn format_distance(meters: f64) -> String {
    let meters = meters.max(0.0);
    if meters < 1000.0 {
        format!("{}m", meters.round() as u64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// `NNN_<distance>.jpg` with a 1-based, zero-padded sequence number.
pub fn image_filename(sequence: usize, distance_m: f64) -> String {
    format!("{:03}_{}.jpg", sequence, format_distance(distance_m))
}

/// Replace anything outside `[A-Za-z0-9_-]` with `_`.
///
/// An empty result becomes `route`.
pub fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = sanitized.trim_matches('_');

    if trimmed.is_empty() {
        "route".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<sanitized name>_streetview.zip`
pub fn archive_filename(route_name: &str) -> String {
    format!("{}_streetview.zip", sanitize_name(route_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(849.6), "850m");
        assert_eq!(format_distance(999.4), "999m");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(1234.0), "1.2km");
        assert_eq!(format_distance(15_460.0), "15.5km");
    }

    #[test]
    fn test_image_filename() {
        assert_eq!(image_filename(1, 0.0), "001_0m.jpg");
        assert_eq!(image_filename(42, 2000.0), "042_2.0km.jpg");
        assert_eq!(image_filename(1234, 50.0), "1234_50m.jpg");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Harbour Loop"), "Harbour_Loop");
        assert_eq!(sanitize_name("  trail/run #3 "), "trail_run__3");
        assert_eq!(sanitize_name("Zürich"), "Z_rich");
        assert_eq!(sanitize_name("///"), "route");
        assert_eq!(sanitize_name(""), "route");
    }

    #[test]
    fn test_archive_filename() {
        assert_eq!(archive_filename("Morning ride"), "Morning_ride_streetview.zip");
    }
}
