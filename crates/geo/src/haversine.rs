//! Haversine distance calculation.
//!
//! The haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// Symmetric, zero for identical points and monotonic in angular separation.
///
/// # Example
/// ```
/// use nextfinish_geo::{haversine_distance, Coordinate};
///
/// let berlin = Coordinate::new(52.5200, 13.4050);
/// let paris = Coordinate::new(48.8566, 2.3522);
///
/// let distance = haversine_distance(&berlin, &paris);
/// assert!((distance - 878.0).abs() < 10.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

/// Distance in kilometers between two raw latitude/longitude pairs.
///
/// Convenience form of [`haversine_distance`] for callers that hold plain numbers.
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_distance(&Coordinate::new(lat1, lon1), &Coordinate::new(lat2, lon2))
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` just outside [0, 1] for antipodal or identical points
    let a = a.clamp(0.0, 1.0);

    radius * 2.0 * a.sqrt().asin()
}
