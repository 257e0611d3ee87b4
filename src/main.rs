// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gameplan API Server
//!
//! Geofenced attendance, daily task streaks and trainer rosters for the
//! mobile client.

use gameplan::{
    config::Config,
    db::FirestoreDb,
    services::{FileStore, IdentityClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Gameplan API");

    // Remote tier: Firestore documents
    let db = FirestoreDb::new(
        &config.gcp_project_id,
        config.firestore_emulator_host.as_deref(),
        config.firestore_bearer_token.clone(),
    )
    .await
    .expect("Failed to connect to Firestore");

    // Accounts: Identity Toolkit
    let identity = IdentityClient::new(
        config.firebase_api_key.clone(),
        config.auth_emulator_host.as_deref(),
    );

    // Local tier: per-student progress on disk
    let store = FileStore::open(&config.data_dir)
        .await
        .expect("Failed to open local data directory");
    tracing::info!(
        latitude = config.default_fence.latitude,
        longitude = config.default_fence.longitude,
        radius_meters = config.default_fence.radius_meters,
        "Default attendance fence"
    );

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(db),
        Arc::new(identity),
        Arc::new(store),
    ));

    // Build router
    let app = gameplan::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gameplan=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
