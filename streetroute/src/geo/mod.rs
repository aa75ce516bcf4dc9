//! Great-circle geodesy on a spherical Earth.
//!
//! Pure functions with no shared state. Everything above this module measures
//! spacing and orientation through [`distance`] and [`bearing`].

use std::fmt;

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl Coordinates {
    /// Create a new coordinate pair.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Great-circle distance between two points in meters (haversine).
///
/// `distance(a, a)` is exactly zero and the result is symmetric in its
/// arguments up to floating-point rounding.
pub fn distance(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` toward `b` in degrees, normalized to `[0, 360)`.
///
/// 0 = North, 90 = East. Identical points carry no direction and yield 0.
pub fn bearing(a: Coordinates, b: Coordinates) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Total length of a polyline in meters, summing consecutive great-circle legs.
pub fn path_length<I>(points: I) -> f64
where
    I: IntoIterator<Item = Coordinates>,
{
    let mut total = 0.0;
    let mut previous: Option<Coordinates> = None;
    for point in points {
        if let Some(prev) = previous {
            total += distance(prev, point);
        }
        previous = Some(point);
    }
    total
}
