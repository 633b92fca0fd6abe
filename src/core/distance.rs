use crate::models::{Origin, Route, Waypoint};
use std::sync::Arc;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Capability interface for distance and route computation
///
/// Callers depend on this trait so that an alternate provider (a paid
/// routing API, an offline matrix) can be substituted without touching
/// the search pipeline.
pub trait DistanceProvider: Send + Sync {
    /// Great-circle distance in kilometers, rounded to 2 decimals
    fn distance(&self, origin: Origin, destination: Origin) -> f64;

    /// Route estimate between two points; `None` when the directions
    /// source reports a non-success status
    fn route(&self, origin: Origin, destination: Origin) -> Option<Route>;
}

/// Outcome of a directions lookup against the external source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionsStatus {
    Ok,
    Unavailable,
}

/// One leg of directions as reported by the external source
#[derive(Debug, Clone, Copy)]
pub struct DirectionsLeg {
    pub status: DirectionsStatus,
    pub distance_m: f64,
    pub duration_secs: f64,
}

/// External directions source behind the adapter
///
/// Duration reported here is deliberately not required to agree with
/// the haversine distance; real routing providers never do.
pub trait DirectionsSource: Send + Sync {
    fn directions(&self, origin: Origin, destination: Origin) -> DirectionsLeg;
}

/// Simulated directions source standing in for a real routing API
#[derive(Debug, Default)]
pub struct SimulatedDirections;

impl DirectionsSource for SimulatedDirections {
    fn directions(&self, _origin: Origin, _destination: Origin) -> DirectionsLeg {
        DirectionsLeg {
            status: DirectionsStatus::Ok,
            distance_m: 1500.0,
            duration_secs: 300.0,
        }
    }
}

/// Adapts the external directions source to the provider interface
///
/// Distance uses local haversine math; routes come from the source with
/// linearly interpolated waypoints between the endpoints.
pub struct GeoAdapter {
    source: Arc<dyn DirectionsSource>,
    route_segments: usize,
}

impl GeoAdapter {
    pub fn new(source: Arc<dyn DirectionsSource>, route_segments: usize) -> Self {
        Self {
            source,
            route_segments,
        }
    }

    pub fn simulated(route_segments: usize) -> Self {
        Self::new(Arc::new(SimulatedDirections), route_segments)
    }
}

impl DistanceProvider for GeoAdapter {
    fn distance(&self, origin: Origin, destination: Origin) -> f64 {
        let km = haversine_distance(origin.lat, origin.lng, destination.lat, destination.lng);
        (km * 100.0).round() / 100.0
    }

    fn route(&self, origin: Origin, destination: Origin) -> Option<Route> {
        let leg = self.source.directions(origin, destination);
        if leg.status != DirectionsStatus::Ok {
            tracing::warn!("Directions source unavailable, returning no route");
            return None;
        }

        Some(Route {
            distance_km: leg.distance_m / 1000.0,
            duration_minutes: leg.duration_secs / 60.0,
            waypoints: interpolate_waypoints(origin, destination, self.route_segments),
        })
    }
}

/// Generate evenly spaced intermediate points between two coordinates
///
/// `segments` line segments produce `segments + 1` waypoints, endpoints
/// included.
pub fn interpolate_waypoints(origin: Origin, destination: Origin, segments: usize) -> Vec<Waypoint> {
    let steps = segments.max(1);
    (0..=steps)
        .map(|i| {
            let ratio = i as f64 / steps as f64;
            Waypoint {
                lat: origin.lat + (destination.lat - origin.lat) * ratio,
                lng: origin.lng + (destination.lng - origin.lng) * ratio,
            }
        })
        .collect()
}
