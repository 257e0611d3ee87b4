// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use gameplan::db::BackendError;
use gameplan::error::AppError;
use gameplan::services::StoreError;

#[test]
fn test_backend_errors_map_to_app_errors() {
    assert!(matches!(
        AppError::from(BackendError::NotFound("students/x".into())),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        AppError::from(BackendError::InvalidCredentials),
        AppError::InvalidCredentials
    ));
    assert!(matches!(
        AppError::from(BackendError::EmailInUse),
        AppError::EmailInUse
    ));
    assert!(matches!(
        AppError::from(BackendError::Unreachable("timeout".into())),
        AppError::BackendUnreachable(_)
    ));
    assert!(matches!(
        AppError::from(BackendError::Rejected("bad field".into())),
        AppError::BadRequest(_)
    ));
}

#[test]
fn test_only_unreachable_is_transient() {
    assert!(BackendError::Unreachable("x".into()).is_transient());
    assert!(!BackendError::PermissionDenied("x".into()).is_transient());
    assert!(!BackendError::NotFound("x".into()).is_transient());
    assert!(!BackendError::Malformed("x".into()).is_transient());
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden, StatusCode::FORBIDDEN),
        (AppError::PermissionDenied, StatusCode::FORBIDDEN),
        (
            AppError::OutOfRange {
                distance_meters: 1500.0,
                radius_meters: 1000.0,
            },
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            AppError::AlreadyMarkedToday("2025-03-01".into()),
            StatusCode::CONFLICT,
        ),
        (AppError::EmailInUse, StatusCode::CONFLICT),
        (AppError::IncompleteTasks, StatusCode::UNPROCESSABLE_ENTITY),
        (
            AppError::BackendUnreachable("down".into()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::Storage("disk full".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        let code = err.code();
        assert_eq!(err.into_response().status(), status, "{}", code);
    }
}

#[test]
fn test_out_of_range_message_has_distance() {
    let err = AppError::OutOfRange {
        distance_meters: 1534.4,
        radius_meters: 1000.0,
    };
    let message = err.to_string();
    assert!(message.contains("1534 m"), "{}", message);
    assert!(message.contains("radius 1000 m"), "{}", message);
}

#[test]
fn test_store_errors_are_storage_errors() {
    let err = AppError::from(StoreError::Corrupt {
        key: "s/streak".into(),
        message: "expected a number".into(),
    });
    assert_eq!(err.code(), "storage_error");
}
