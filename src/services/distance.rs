// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance between two coordinates.

use crate::models::GeoLocation;
use geo::{Distance, Haversine};

/// Haversine distance in meters.
///
/// NaN coordinates yield NaN; callers that gate on the result must treat NaN
/// as "not within".
pub fn distance_meters(a: GeoLocation, b: GeoLocation) -> f64 {
    Haversine.distance(a.to_point(), b.to_point())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = GeoLocation::new(56.1971946, 15.6188414);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = GeoLocation::new(56.1971946, 15.6188414);
        let b = GeoLocation::new(56.16156, 15.58661);
        assert_eq!(distance_meters(a, b), distance_meters(b, a));
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // ~111.2 km on a sphere of radius 6371.0088 km
        let d = distance_meters(GeoLocation::new(0.0, 0.0), GeoLocation::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 10.0, "got {}", d);
    }

    #[test]
    fn test_known_city_pair() {
        // Stockholm -> Gothenburg, roughly 398 km
        let stockholm = GeoLocation::new(59.3293, 18.0686);
        let gothenburg = GeoLocation::new(57.7089, 11.9746);
        let km = distance_meters(stockholm, gothenburg) / 1000.0;
        assert!((390.0..405.0).contains(&km), "got {} km", km);
    }

    #[test]
    fn test_nan_propagates() {
        let d = distance_meters(GeoLocation::new(f64::NAN, 0.0), GeoLocation::new(0.0, 0.0));
        assert!(d.is_nan());
    }
}
