// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod attendance;
pub mod forms;
pub mod location;
pub mod streak;
pub mod student;
pub mod task;
pub mod trainer;
pub mod user;

pub use attendance::{
    AttendanceMap, AttendanceRecord, CalendarDisplay, CalendarDisplayEntry, MARKED_COLOR,
};
pub use location::{
    GeoLocation, GeofenceConfig, DEFAULT_FENCE_LATITUDE, DEFAULT_FENCE_LONGITUDE,
    DEFAULT_FENCE_RADIUS_METERS,
};
pub use streak::{SaveOutcome, StreakState};
pub use student::{Student, StudentSummary};
pub use task::{TaskBoard, TaskId, TaskItem, EXERCISE_CATEGORY, PRACTICE_CATEGORY};
pub use trainer::Trainer;
pub use user::{AuthenticatedUser, Credentials, Role};
