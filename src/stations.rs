//! Nearest ground-station lookup
//!
//! Distances are computed by a pluggable [`DistanceMetric`]. The default,
//! [`PlanarDistance`], treats latitude and longitude as Cartesian axes: it is
//! not geodesic, over-weights longitude away from the equator and is only
//! adequate for ranking stations within a single country. Use
//! [`HaversineDistance`] where great-circle accuracy matters.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::models::{Coordinate, StationRecord};

/// Station directory keyed by station id
pub type StationDirectory = HashMap<String, StationRecord>;

/// Distance between two decimal-degree coordinates
pub trait DistanceMetric {
    fn distance(&self, from: &Coordinate, to: &Coordinate) -> f64;
}

/// `sqrt(Δlat² + Δlon²)` in degrees
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarDistance;

impl DistanceMetric for PlanarDistance {
    fn distance(&self, from: &Coordinate, to: &Coordinate) -> f64 {
        let dlat = from.latitude - to.latitude;
        let dlon = from.longitude - to.longitude;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

/// Great-circle distance in kilometers
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineDistance;

impl DistanceMetric for HaversineDistance {
    fn distance(&self, from: &Coordinate, to: &Coordinate) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: from.latitude,
                longitude: from.longitude,
            },
            haversine::Location {
                latitude: to.latitude,
                longitude: to.longitude,
            },
            haversine::Units::Kilometers,
        )
    }
}

/// A located station and its distance from the target
#[derive(Debug, Clone, PartialEq)]
pub struct NearestStation {
    pub id: String,
    pub name: String,
    pub distance: f64,
}

/// Finds the station closest to a coordinate
#[derive(Debug, Clone, Default)]
pub struct StationLocator<M = PlanarDistance> {
    metric: M,
}

impl StationLocator<PlanarDistance> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metric: PlanarDistance,
        }
    }
}

impl<M: DistanceMetric> StationLocator<M> {
    #[must_use]
    pub fn with_metric(metric: M) -> Self {
        Self { metric }
    }

    /// Nearest station to `target`. Equal distances resolve to the lowest id
    /// so the result does not depend on directory iteration order.
    #[must_use]
    pub fn nearest<'a, I>(&self, target: &Coordinate, stations: I) -> Option<NearestStation>
    where
        I: IntoIterator<Item = (&'a String, &'a StationRecord)>,
    {
        let nearest = stations
            .into_iter()
            .map(|(id, record)| (id, record, self.metric.distance(target, &record.coordinate())))
            .filter(|(_, _, distance)| distance.is_finite())
            .min_by(|a, b| a.2.total_cmp(&b.2).then_with(|| compare_station_ids(a.0, b.0)))?;

        debug!(
            "Nearest station to {} is {} ({}) at {:.4}",
            target.format_coordinates(),
            nearest.0,
            nearest.1.name,
            nearest.2
        );

        Some(NearestStation {
            id: nearest.0.clone(),
            name: nearest.1.name.clone(),
            distance: nearest.2,
        })
    }

    /// Nearest station in a directory map
    #[must_use]
    pub fn nearest_in(&self, target: &Coordinate, directory: &StationDirectory) -> Option<NearestStation> {
        self.nearest(target, directory.iter())
    }
}

/// Numeric order when both ids are numeric, lexicographic otherwise
fn compare_station_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}
