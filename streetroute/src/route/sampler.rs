//! Fixed-interval route sampling.
//!
//! # Algorithm
//!
//! - The first input point always seeds the output
//! - Consecutive legs are accumulated with [`geo::distance`]; once the running
//!   total reaches the interval, the current point is kept and the total resets
//! - The last input point is appended if it is not already the last output
//! - Cumulative distance sums legs between *output* points, and each heading
//!   aims at the next output point
//!
//! [`geo::distance`]: crate::geo::distance

use tracing::debug;

use super::viewpoint::{Viewpoint, ViewpointId};
use super::SamplingError;
use crate::geo::{self, Coordinates};
use crate::track::GeoPoint;

/// Default spacing between viewpoints in meters.
pub const DEFAULT_INTERVAL_M: f64 = 50.0;

/// Target spacing for route sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    interval_distance: f64,
}

impl SamplingConfig {
    /// Create a config with the given interval in meters.
    ///
    /// # Errors
    ///
    /// [`SamplingError::InvalidInterval`] unless the interval is finite and
    /// strictly positive.
    pub fn new(interval_distance: f64) -> Result<Self, SamplingError> {
        if !interval_distance.is_finite() || interval_distance <= 0.0 {
            return Err(SamplingError::InvalidInterval(interval_distance));
        }
        Ok(Self { interval_distance })
    }

    /// Interval in meters.
    pub fn interval_distance(&self) -> f64 {
        self.interval_distance
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_distance: DEFAULT_INTERVAL_M,
        }
    }
}

/// Reduce a dense point sequence to viewpoints spaced by the configured interval.
///
/// # Errors
///
/// - [`SamplingError::InsufficientPoints`] for fewer than two points
/// - [`SamplingError::NoSamples`] if nothing was selected
pub fn sample(points: &[GeoPoint], config: &SamplingConfig) -> Result<Vec<Viewpoint>, SamplingError> {
    let (first, last) = match points {
        [first, .., last] => (first.coordinates(), last.coordinates()),
        _ => return Err(SamplingError::InsufficientPoints(points.len())),
    };

    let mut selected: Vec<Coordinates> = vec![first];
    let mut accumulated = 0.0;

    for leg in points.windows(2) {
        let to = leg[1].coordinates();
        accumulated += geo::distance(leg[0].coordinates(), to);
        if accumulated >= config.interval_distance {
            selected.push(to);
            accumulated = 0.0;
        }
    }

    if selected.last() != Some(&last) {
        selected.push(last);
    }

    if selected.is_empty() {
        return Err(SamplingError::NoSamples);
    }

    let viewpoints = build_viewpoints(&selected);
    debug!(
        input_points = points.len(),
        viewpoints = viewpoints.len(),
        interval_m = config.interval_distance,
        "Sampled route"
    );
    Ok(viewpoints)
}

fn build_viewpoints(selected: &[Coordinates]) -> Vec<Viewpoint> {
    let mut cumulative = 0.0;

    selected
        .iter()
        .enumerate()
        .map(|(index, &coordinates)| {
            if index > 0 {
                cumulative += geo::distance(selected[index - 1], coordinates);
            }
            let heading = selected
                .get(index + 1)
                .map(|&next| geo::bearing(coordinates, next));
            Viewpoint::new(ViewpointId(index), coordinates, heading, cumulative)
        })
        .collect()
}

/// Owns a flattened point sequence and the viewpoints sampled from it.
///
/// Changing the config regenerates the whole sequence; nothing from the
/// previous sequence survives.
#[derive(Debug, Clone)]
pub struct RouteSampler {
    points: Vec<GeoPoint>,
    config: SamplingConfig,
    viewpoints: Vec<Viewpoint>,
}

impl RouteSampler {
    /// Sample `points` with `config`.
    pub fn new(points: Vec<GeoPoint>, config: SamplingConfig) -> Result<Self, SamplingError> {
        let viewpoints = sample(&points, &config)?;
        Ok(Self {
            points,
            config,
            viewpoints,
        })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn config(&self) -> SamplingConfig {
        self.config
    }

    pub fn viewpoints(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    /// Replace the config and regenerate every viewpoint.
    ///
    /// On error the previous config and sequence are kept.
    pub fn set_config(&mut self, config: SamplingConfig) -> Result<&[Viewpoint], SamplingError> {
        let viewpoints = sample(&self.points, &config)?;
        self.config = config;
        self.viewpoints = viewpoints;
        Ok(&self.viewpoints)
    }

    pub fn into_viewpoints(self) -> Vec<Viewpoint> {
        self.viewpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::LoadState;
    use proptest::prelude::*;

    fn points(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords
            .iter()
            .map(|&(lat, lon)| GeoPoint::new(lat, lon))
            .collect()
    }

    fn config(interval: f64) -> SamplingConfig {
        SamplingConfig::new(interval).unwrap()
    }

    #[test]
    fn test_three_point_scenario() {
        let input = points(&[(0.0, 0.0), (0.0, 0.00045), (0.0, 0.0009)]);
        let out = sample(&input, &config(50.0)).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].coordinates(), Coordinates::new(0.0, 0.0));
        assert_eq!(out[2].coordinates(), Coordinates::new(0.0, 0.0009));
        assert!(out[0].cumulative_distance() < out[1].cumulative_distance());
        assert!(out[1].cumulative_distance() < out[2].cumulative_distance());
    }

    #[test]
    fn test_headings_defined_except_last() {
        let input = points(&[(0.0, 0.0), (0.0, 0.00045), (0.0, 0.0009)]);
        let out = sample(&input, &config(50.0)).unwrap();

        assert!((out[0].heading().unwrap() - 90.0).abs() < 1e-6);
        assert!((out[1].heading().unwrap() - 90.0).abs() < 1e-6);
        assert!(out[2].heading().is_none());
    }

    #[test]
    fn test_endpoint_appended_when_short() {
        // Legs of ~50m then ~11m: the final point is closer than the interval
        let input = points(&[(0.0, 0.0), (0.0, 0.00045), (0.0, 0.00055)]);
        let out = sample(&input, &config(50.0)).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[2].coordinates(), Coordinates::new(0.0, 0.00055));
    }

    #[test]
    fn test_dense_points_are_thinned() {
        // Ten legs of ~5m each, sampled every 20m
        let input: Vec<GeoPoint> = (0..=10)
            .map(|i| GeoPoint::new(0.0, i as f64 * 0.000045))
            .collect();
        let out = sample(&input, &config(20.0)).unwrap();

        // Selected at legs 4 and 8, then the endpoint
        assert_eq!(out.len(), 4);
        assert_eq!(out[1].coordinates(), input[4].coordinates());
        assert_eq!(out[2].coordinates(), input[8].coordinates());
        assert_eq!(out[3].coordinates(), input[10].coordinates());
    }

    #[test]
    fn test_cumulative_distance_uses_sampled_legs() {
        // Out-and-back detour: the along-path length is much longer than the
        // straight line between the sampled points
        let input = points(&[(0.0, 0.0), (0.001, 0.0), (0.0, 0.0), (0.0, 0.001)]);
        let out = sample(&input, &config(500.0)).unwrap();

        assert_eq!(out.len(), 2);
        let expected = geo::distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 0.001));
        assert!((out[1].cumulative_distance() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ids_are_sequence_indices_and_pending() {
        let input = points(&[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)]);
        let out = sample(&input, &config(50.0)).unwrap();

        for (index, vp) in out.iter().enumerate() {
            assert_eq!(vp.id(), ViewpointId(index));
            assert_eq!(vp.load_state(), LoadState::Pending);
        }
    }

    #[test]
    fn test_identical_points_yield_single_viewpoint() {
        let input = points(&[(1.0, 1.0), (1.0, 1.0)]);
        let out = sample(&input, &config(50.0)).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].heading().is_none());
    }

    #[test]
    fn test_insufficient_points() {
        assert_eq!(
            sample(&[], &config(50.0)),
            Err(SamplingError::InsufficientPoints(0))
        );
        assert_eq!(
            sample(&points(&[(1.0, 1.0)]), &config(50.0)),
            Err(SamplingError::InsufficientPoints(1))
        );
    }

    #[test]
    fn test_invalid_interval() {
        assert!(matches!(
            SamplingConfig::new(0.0),
            Err(SamplingError::InvalidInterval(_))
        ));
        assert!(SamplingConfig::new(-5.0).is_err());
        assert!(SamplingConfig::new(f64::NAN).is_err());
        assert!(SamplingConfig::new(f64::INFINITY).is_err());
        assert_eq!(SamplingConfig::default().interval_distance(), 50.0);
    }

    #[test]
    fn test_route_sampler_regenerates_on_config_change() {
        let input: Vec<GeoPoint> = (0..=20)
            .map(|i| GeoPoint::new(0.0, i as f64 * 0.000045))
            .collect();
        let mut sampler = RouteSampler::new(input, config(10.0)).unwrap();
        let dense = sampler.viewpoints().len();

        let sparse = sampler.set_config(config(40.0)).unwrap().len();
        assert!(sparse < dense);
        assert_eq!(sampler.config().interval_distance(), 40.0);
    }

    proptest! {
        #[test]
        fn prop_endpoints_and_monotone_distance(
            coords in prop::collection::vec((-60.0f64..60.0, -170.0f64..170.0), 2..40),
            interval in 1.0f64..200_000.0,
        ) {
            let input = points(&coords);
            let out = sample(&input, &config(interval)).unwrap();

            prop_assert_eq!(out[0].coordinates(), input[0].coordinates());
            prop_assert_eq!(
                out[out.len() - 1].coordinates(),
                input[input.len() - 1].coordinates()
            );
            for pair in out.windows(2) {
                prop_assert!(pair[0].cumulative_distance() <= pair[1].cumulative_distance());
                prop_assert!(pair[0].heading().is_some());
            }
            prop_assert!(out[out.len() - 1].heading().is_none());
        }
    }
}
