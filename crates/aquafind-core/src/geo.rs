//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::api::FountainError;

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Deserialization goes through [`Coordinate::new`], so a stored value out
/// of range fails to decode instead of reaching callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = FountainError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside lat [-90, 90] / lon [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, FountainError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(FountainError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Haversine distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_METERS * c
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_deserialize_validates_range() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 51.5, "longitude": -0.12}"#).unwrap();
        assert_eq!(ok, Coordinate::new(51.5, -0.12).unwrap());

        let err = serde_json::from_str::<Coordinate>(r#"{"latitude": 95.0, "longitude": 0.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid coordinate"), "got {err}");
        assert!(serde_json::from_str::<Coordinate>(r#"{"latitude": 0.0, "longitude": 200.0}"#).is_err());
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let c = Coordinate::new(40.7128, -74.0060).unwrap();
        assert!(c.distance_to(&c).abs() < 1e-6);
    }

    #[test]
    fn test_distance_new_york_to_los_angeles() {
        let nyc = Coordinate::new(40.7128, -74.0060).unwrap();
        let la = Coordinate::new(34.0522, -118.2437).unwrap();
        let d = nyc.distance_to(&la);
        // ~3936 km great-circle
        assert!((d - 3_936_000.0).abs() < 20_000.0, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(51.5074, -0.1278).unwrap();
        let b = Coordinate::new(48.8566, 2.3522).unwrap();
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn test_short_distance_is_not_flat_earth() {
        // One degree of longitude at 60N is about half of one at the equator
        let equator = Coordinate::new(0.0, 0.0).unwrap().distance_to(&Coordinate::new(0.0, 1.0).unwrap());
        let north = Coordinate::new(60.0, 0.0).unwrap().distance_to(&Coordinate::new(60.0, 1.0).unwrap());
        assert!((north / equator - 0.5).abs() < 0.01);
    }
}
