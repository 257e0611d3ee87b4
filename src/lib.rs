// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gameplan: geofenced attendance and daily task streaks for sports coaching
//!
//! This crate provides the backend API for the mobile client: trainers publish
//! an attendance fence and assign tasks, students mark attendance from inside
//! the fence and keep a streak of fully completed task days.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{Backend, Database};
use services::{
    AccountService, AttendanceWorkflow, IdentityProvider, KeyValueStore, ProfileService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub workflow: AttendanceWorkflow,
}

impl AppState {
    /// Wire services over the given backend, identity provider and local store.
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        identity: Arc<dyn IdentityProvider>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        let db = Database::new(backend);
        let accounts = AccountService::new(identity, db.clone());
        let profiles = ProfileService::new(db.clone(), kv.clone(), config.default_fence);
        let workflow = AttendanceWorkflow::new(kv, Arc::new(db.clone()));

        Self {
            config,
            db,
            accounts,
            profiles,
            workflow,
        }
    }
}
