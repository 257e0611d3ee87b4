// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geofence check gating attendance marking.
//!
//! A failed location lookup never counts as "inside": permission denial,
//! provider errors and out-of-range positions are distinct outcomes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;
use crate::models::{GeoLocation, GeofenceConfig};
use crate::services::distance::distance_meters;

/// Inclusive radius check.
pub fn is_within_fence(current: GeoLocation, fence: &GeofenceConfig) -> bool {
    distance_meters(current, fence.center()) <= fence.radius_meters
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Errors from a location provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocationError {
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Source of the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_location(&self) -> Result<GeoLocation, LocationError>;
}

/// Outcome of a geofence check.
#[derive(Debug, Clone, PartialEq)]
pub enum FenceStatus {
    Inside { distance_meters: f64 },
    Outside { distance_meters: f64, radius_meters: f64 },
    PermissionDenied,
    LocationUnavailable(String),
}

impl FenceStatus {
    pub fn is_inside(&self) -> bool {
        matches!(self, FenceStatus::Inside { .. })
    }

    /// Turn anything but `Inside` into the matching error.
    pub fn ensure_inside(&self) -> Result<f64, AppError> {
        match self {
            FenceStatus::Inside { distance_meters } => Ok(*distance_meters),
            FenceStatus::Outside {
                distance_meters,
                radius_meters,
            } => Err(AppError::OutOfRange {
                distance_meters: *distance_meters,
                radius_meters: *radius_meters,
            }),
            FenceStatus::PermissionDenied => Err(AppError::PermissionDenied),
            FenceStatus::LocationUnavailable(reason) => {
                Err(AppError::LocationUnavailable(reason.clone()))
            }
        }
    }
}

/// Ask the provider for a position and compare it against the fence.
pub async fn check_fence(provider: &dyn LocationProvider, fence: &GeofenceConfig) -> FenceStatus {
    if provider.request_permission().await == PermissionStatus::Denied {
        tracing::info!("Location permission denied");
        return FenceStatus::PermissionDenied;
    }

    let current = match provider.current_location().await {
        Ok(location) => location,
        Err(LocationError::Unavailable(reason)) => {
            tracing::warn!(reason = %reason, "Location unavailable");
            return FenceStatus::LocationUnavailable(reason);
        }
    };

    if !current.latitude.is_finite() || !current.longitude.is_finite() {
        return FenceStatus::LocationUnavailable("invalid coordinates".to_string());
    }

    let distance = distance_meters(current, fence.center());
    tracing::debug!(
        distance_meters = distance,
        radius_meters = fence.radius_meters,
        "Geofence check"
    );

    if distance <= fence.radius_meters {
        FenceStatus::Inside {
            distance_meters: distance,
        }
    } else {
        FenceStatus::Outside {
            distance_meters: distance,
            radius_meters: fence.radius_meters,
        }
    }
}

/// Position the client device reported with its request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportedLocation {
    pub permission: PermissionStatus,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    /// Provider error text when the device could not get a fix.
    #[serde(default)]
    pub error: Option<String>,
}

#[async_trait]
impl LocationProvider for ReportedLocation {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn current_location(&self) -> Result<GeoLocation, LocationError> {
        match (&self.location, &self.error) {
            (_, Some(error)) => Err(LocationError::Unavailable(error.clone())),
            (Some(location), None) => Ok(*location),
            (None, None) => Err(LocationError::Unavailable(
                "no coordinates reported".to_string(),
            )),
        }
    }
}

/// Provider with a fixed answer.
#[derive(Debug, Clone)]
pub struct FixedLocation(pub Result<GeoLocation, PermissionStatus>);

impl FixedLocation {
    pub fn at(location: GeoLocation) -> Self {
        Self(Ok(location))
    }

    pub fn denied() -> Self {
        Self(Err(PermissionStatus::Denied))
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> PermissionStatus {
        match self.0 {
            Ok(_) => PermissionStatus::Granted,
            Err(status) => status,
        }
    }

    async fn current_location(&self) -> Result<GeoLocation, LocationError> {
        self.0
            .map_err(|_| LocationError::Unavailable("permission not granted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Destination, Haversine};

    fn fence() -> GeofenceConfig {
        GeofenceConfig::default()
    }

    fn point_at(distance: f64) -> GeoLocation {
        GeoLocation::from_point(Haversine.destination(fence().center().to_point(), 90.0, distance))
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let point = point_at(1000.0);
        let exact = distance_meters(point, fence().center());

        let at_radius = GeofenceConfig {
            radius_meters: exact,
            ..fence()
        };
        assert!(is_within_fence(point, &at_radius));

        let one_meter_short = GeofenceConfig {
            radius_meters: exact - 1.0,
            ..fence()
        };
        assert!(!is_within_fence(point, &one_meter_short));
    }

    #[test]
    fn test_far_point_is_outside() {
        assert!(is_within_fence(point_at(10.0), &fence()));
        assert!(!is_within_fence(point_at(1001.5), &fence()));
    }

    #[test]
    fn test_nan_is_never_inside() {
        assert!(!is_within_fence(GeoLocation::new(f64::NAN, 15.0), &fence()));
    }

    #[tokio::test]
    async fn test_check_fence_inside_and_outside() {
        let inside = check_fence(&FixedLocation::at(point_at(200.0)), &fence()).await;
        assert!(inside.is_inside());
        assert!(inside.ensure_inside().is_ok());

        let outside = check_fence(&FixedLocation::at(point_at(5000.0)), &fence()).await;
        assert!(matches!(outside, FenceStatus::Outside { .. }));
        assert!(matches!(
            outside.ensure_inside(),
            Err(AppError::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_permission_denied_is_distinct() {
        let status = check_fence(&FixedLocation::denied(), &fence()).await;
        assert_eq!(status, FenceStatus::PermissionDenied);
        assert!(matches!(status.ensure_inside(), Err(AppError::PermissionDenied)));
    }

    #[tokio::test]
    async fn test_reported_location_errors() {
        let no_fix = ReportedLocation {
            permission: PermissionStatus::Granted,
            location: None,
            error: Some("GPS timeout".to_string()),
        };
        assert_eq!(
            check_fence(&no_fix, &fence()).await,
            FenceStatus::LocationUnavailable("GPS timeout".to_string())
        );

        let nothing = ReportedLocation {
            permission: PermissionStatus::Granted,
            location: None,
            error: None,
        };
        assert!(matches!(
            check_fence(&nothing, &fence()).await,
            FenceStatus::LocationUnavailable(_)
        ));

        let garbage = ReportedLocation {
            permission: PermissionStatus::Granted,
            location: Some(GeoLocation::new(f64::NAN, f64::NAN)),
            error: None,
        };
        assert!(matches!(
            check_fence(&garbage, &fence()).await,
            FenceStatus::LocationUnavailable(_)
        ));
    }
}
