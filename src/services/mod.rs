// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod calendar;
pub mod distance;
pub mod eligibility;
pub mod geofence;
pub mod identity;
pub mod kv;
pub mod profiles;
pub mod progress;
pub mod workflow;

pub use accounts::{AccountService, SignedIn};
pub use calendar::to_calendar_display;
pub use distance::distance_meters;
pub use eligibility::{has_attended_enough_classes, is_eligible_for_certification};
pub use geofence::{check_fence, is_within_fence, FenceStatus, LocationProvider};
pub use identity::{IdentityClient, IdentityProvider};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use profiles::ProfileService;
pub use progress::{Progress, ProgressStore};
pub use workflow::{AttendanceWorkflow, ProgressMirror, StudentSession, SyncStatus};
