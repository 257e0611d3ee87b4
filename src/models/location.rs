// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Coordinates and the trainer-controlled attendance fence.

use geo::Point;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Bootstrap fence used until a trainer publishes a live location.
pub const DEFAULT_FENCE_LATITUDE: f64 = 56.1971946;
pub const DEFAULT_FENCE_LONGITUDE: f64 = 15.6188414;
pub const DEFAULT_FENCE_RADIUS_METERS: f64 = 1000.0;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `geo` points are (x = longitude, y = latitude).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    pub fn from_point(point: Point<f64>) -> Self {
        Self {
            latitude: point.y(),
            longitude: point.x(),
        }
    }
}

/// Circle a student must be inside to mark attendance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct GeofenceConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

impl GeofenceConfig {
    pub fn new(center: GeoLocation, radius_meters: f64) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            radius_meters,
        }
    }

    pub fn center(&self) -> GeoLocation {
        GeoLocation::new(self.latitude, self.longitude)
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_FENCE_LATITUDE,
            longitude: DEFAULT_FENCE_LONGITUDE,
            radius_meters: DEFAULT_FENCE_RADIUS_METERS,
        }
    }
}
