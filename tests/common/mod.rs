// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use gameplan::config::Config;
use gameplan::db::{Backend, FirestoreDb, MemoryBackend, WriteMode};
use gameplan::middleware::auth::create_jwt;
use gameplan::models::Role;
use gameplan::routes::create_router;
use gameplan::services::MemoryStore;
use gameplan::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection against the emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    let host = std::env::var("FIRESTORE_EMULATOR_HOST").ok();
    FirestoreDb::new("test-project", host.as_deref(), None)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test app over in-memory backend and store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub backend: MemoryBackend,
    pub store: Arc<MemoryStore>,
}

/// Create a test app with in-memory dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let backend = MemoryBackend::new();
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        store.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        backend,
        store,
    }
}

/// Create a test app whose backend is the offline Firestore mock.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    let backend = MemoryBackend::new();
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Arc::new(FirestoreDb::new_mock()),
        Arc::new(backend),
        Arc::new(MemoryStore::new()),
    ));
    (create_router(state.clone()), state)
}

/// Session token for `uid` signed with the test key.
#[allow(dead_code)]
pub fn token_for(uid: &str, role: Role) -> String {
    create_jwt(uid, role, &Config::test_default().jwt_signing_key).unwrap()
}

/// Build a JSON request, with a bearer token when given.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a bodyless GET request, with a bearer token when given.
#[allow(dead_code)]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Seed a trainer document with its fence at `(lat, lon)`; returns the uid.
#[allow(dead_code)]
pub async fn seed_trainer(app: &TestApp, email: &str, lat: f64, lon: f64) -> String {
    let uid = app.backend.add_account(email, "secret123");
    let doc = json!({
        "trainerID": uid,
        "name": "Coach",
        "email": email,
        "location": { "latitude": lat, "longitude": lon, "radiusMeters": 1000.0 }
    });
    app.backend
        .set_document("trainers", &uid, doc, WriteMode::Overwrite)
        .await
        .unwrap();
    uid
}

/// Seed a student document linked to `trainer_uid`; returns the uid.
#[allow(dead_code)]
pub async fn seed_student(
    app: &TestApp,
    email: &str,
    trainer_uid: &str,
    code: &str,
    name: &str,
) -> String {
    let uid = app.backend.add_account(email, "secret123");
    let doc = json!({
        "studentID": code,
        "name": name,
        "email": email,
        "trainerID": trainer_uid,
        "sport": "Football",
        "streak": 0,
        "attendance": {}
    });
    app.backend
        .set_document("students", &uid, doc, WriteMode::Overwrite)
        .await
        .unwrap();
    uid
}
