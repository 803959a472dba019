//! Geospatial utilities for NextFinish.
//!
//! This crate provides:
//! - Great-circle (haversine) distance calculations
//! - A [`Coordinate`] type with the "both halves or nothing" rule used by the catalog
//! - Batch distance annotation with optional parallelism
//!
//! # Example
//!
//! ```
//! use nextfinish_geo::{haversine_distance, Coordinate};
//!
//! let leipzig = Coordinate::new(51.3397, 12.3731);
//! let berlin = Coordinate::new(52.5200, 13.4050);
//!
//! let distance_km = haversine_distance(&leipzig, &berlin);
//! assert!((distance_km - 149.0).abs() < 5.0);
//! ```

mod error;
mod haversine;
pub mod batch;

pub use batch::{calculate_distances, DistanceResult};
pub use error::{GeoError, Result};
pub use haversine::{distance_km, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M};

/// A geographic coordinate with latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without validation.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Builds a coordinate from two optional halves.
    ///
    /// Returns `None` unless both halves are present, finite and in range.
    /// A half-present pair is treated the same as a missing one.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        let coord = Self::new(latitude?, longitude?);
        coord.is_valid().then_some(coord)
    }

    /// Parses a coordinate from decimal-degree strings, as returned by geocoders.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidCoordinate`] if either half does not parse
    /// to a finite, in-range number.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat: f64 = latitude
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("latitude {latitude:?} is not a number")))?;
        let lng: f64 = longitude
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("longitude {longitude:?} is not a number")))?;

        let coord = Self::new(lat, lng);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!("({lat}, {lng}) is out of range")))
        }
    }

    /// Returns true if both halves are finite and within the WGS84 ranges.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}
