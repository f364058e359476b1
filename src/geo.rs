//! Great-circle bearing and distance math for the Qibla target

use crate::error::CompassError;

/// Earth radius used by the haversine formula, in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated geographic coordinate
///
/// Construction fails with [`CompassError::InvalidCoordinate`] when the
/// latitude leaves [-90, 90] or the longitude leaves [-180, 180];
/// out-of-range inputs are never clamped.
///
/// # Example
/// ```
/// use qibla_compass::geo::Coordinate;
///
/// let cairo = Coordinate::new(30.0444, 31.2357).unwrap();
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// The fixed Qibla target: the Kaaba in Mecca
pub const KAABA: Coordinate = Coordinate {
    latitude: 21.4224779,
    longitude: 39.8251832,
};

impl Coordinate {
    /// Create a coordinate, validating both components
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CompassError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(CompassError::InvalidCoordinate { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Initial great-circle bearing from `origin` to `target`
///
/// Uses the standard spherical formula: atan2 of the sine/cosine terms on
/// the longitude delta. The result is in degrees, normalized to [0, 360),
/// with 0° = north and clockwise-positive.
///
/// # Example
/// ```
/// use qibla_compass::geo::{Coordinate, bearing};
///
/// let origin = Coordinate::new(0.0, 0.0).unwrap();
/// let east = Coordinate::new(0.0, 1.0).unwrap();
/// assert!((bearing(origin, east) - 90.0).abs() < 0.1);
/// ```
pub fn bearing(origin: Coordinate, target: Coordinate) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = target.latitude.to_radians();
    let delta_lon = (target.longitude - origin.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Haversine distance between two coordinates, in kilometers
pub fn distance_km(origin: Coordinate, target: Coordinate) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = target.latitude.to_radians();
    let delta_lat = (target.latitude - origin.latitude).to_radians();
    let delta_lon = (target.longitude - origin.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
