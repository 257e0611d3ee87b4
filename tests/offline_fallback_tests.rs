// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Behavior when the remote backend cannot be reached.
//!
//! Student progress is written locally first; the remote copy is best-effort
//! and a failure is reported as `synced: false` instead of an error.

use axum::http::StatusCode;
use gameplan::models::{Role, DEFAULT_FENCE_LATITUDE, DEFAULT_FENCE_LONGITUDE};
use gameplan::services::workflow::NOT_SYNCED_NOTICE;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_offline_app, create_test_app, get_request, json_request, token_for};

#[tokio::test]
async fn test_attendance_saved_locally_when_backend_down() {
    let app = create_test_app();
    let coach = common::seed_trainer(&app, "coach@example.com", 10.0, 20.0).await;
    let ada = common::seed_student(&app, "ada@example.com", &coach, "111111", "Ada").await;

    // Login keeps a local copy of the profile
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "secret123", "role": "student" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["student"]["studentID"], "111111");
    let token = body["token"].as_str().unwrap().to_string();

    app.backend.set_unreachable(true);

    // Trainer fence can't be read either, so the default fence applies
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/student/attendance",
            Some(&token),
            json!({
                "permission": "granted",
                "location": { "latitude": DEFAULT_FENCE_LATITUDE, "longitude": DEFAULT_FENCE_LONGITUDE }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["synced"], false);
    assert_eq!(body["notice"], NOT_SYNCED_NOTICE);
    let date = body["date"].as_str().unwrap().to_string();

    // Local calendar has the day
    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/student/attendance/calendar", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[&date]["marked"], true);

    // Remote copy does not
    app.backend.set_unreachable(false);
    let doc = app.backend.document("students", &ada).unwrap();
    assert!(doc["attendance"].get(&date).is_none());

    // Still only one mark per day, even once the backend is back
    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/student/attendance",
            Some(&token),
            json!({ "permission": "granted", "location": { "latitude": 10.0, "longitude": 20.0 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_student_without_local_copy_needs_backend() {
    let (app, _) = create_offline_app();
    let token = token_for("uid-unknown", Role::Student);

    let response = app
        .oneshot(get_request("/api/student/dashboard", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "backend_unreachable");
}

#[tokio::test]
async fn test_trainer_roster_needs_backend() {
    let (app, _) = create_offline_app();
    let token = token_for("uid-trainer", Role::Trainer);

    let response = app
        .oneshot(get_request("/api/trainer/students", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_trainer_profile_saved_locally_when_backend_down() {
    let app = create_test_app();
    let coach = common::seed_trainer(&app, "coach@example.com", 0.0, 0.0).await;
    let token = token_for(&coach, Role::Trainer);

    app.backend.set_unreachable(true);

    let response = app
        .router
        .oneshot(json_request(
            "PUT",
            "/api/trainer/profile",
            Some(&token),
            json!({
                "name": "Coach Carter",
                "age": 45,
                "sportSpecialty": "Basketball",
                "email": "coach@example.com",
                "address": "Main St 1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["synced"], false);
    assert_eq!(body["profile"]["name"], "Coach Carter");

    app.backend.set_unreachable(false);
    let doc = app.backend.document("trainers", &coach).unwrap();
    assert_eq!(doc["name"], "Coach");
}
